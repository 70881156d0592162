//! Events accepted by the workspace.

use std::path::PathBuf;

use crate::aoi::DrawnShape;

/// One user-initiated event.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    /// The draw tool completed a shape.
    DrawCompleted(DrawnShape),
    /// A file was picked for import.
    FileSelected(PathBuf),
    /// Archive bytes arrived without a file on disk.
    ArchiveLoaded(Vec<u8>),
    /// Basemap picker changed; carries the basemap key.
    BasemapChosen(String),
    /// Overlay slider moved.
    OpacityChanged(f64),
    SearchSubmitted(String),
    ExportGeometryRequested,
    SnapshotRequested,
}
