//! Workspace status signal.
//!
//! A single last-writer-wins value rendered as one line of text. Every
//! state-changing operation overwrites it; nothing is appended.

use std::fmt;

use tokio::sync::watch;
use tracing::trace;

use crate::basemap::BasemapId;

/// Current workspace status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceStatus {
    Ready,
    MapReady,
    Basemap(BasemapId),
    AoiAdded,
    LoadingShapefile,
    ShapefileLoaded,
    UploadFailed,
    Searching,
    /// Display label of the last successful search.
    Located(String),
    NoResults,
    SearchFailed,
    GeoJsonExported,
    ExportFailed,
    CapturingScreenshot,
    ScreenshotSaved,
    ScreenshotFailed,
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceStatus::Ready => write!(f, "Ready"),
            WorkspaceStatus::MapReady => write!(f, "Map ready"),
            WorkspaceStatus::Basemap(id) => write!(f, "Basemap: {}", id),
            WorkspaceStatus::AoiAdded => write!(f, "AOI added"),
            WorkspaceStatus::LoadingShapefile => write!(f, "Loading shapefile…"),
            WorkspaceStatus::ShapefileLoaded => write!(f, "Shapefile loaded"),
            WorkspaceStatus::UploadFailed => write!(f, "Upload failed"),
            WorkspaceStatus::Searching => write!(f, "Searching…"),
            WorkspaceStatus::Located(label) => write!(f, "{}", label),
            WorkspaceStatus::NoResults => write!(f, "No results"),
            WorkspaceStatus::SearchFailed => write!(f, "Search failed"),
            WorkspaceStatus::GeoJsonExported => write!(f, "GeoJSON exported"),
            WorkspaceStatus::ExportFailed => write!(f, "Export failed"),
            WorkspaceStatus::CapturingScreenshot => write!(f, "Capturing screenshot..."),
            WorkspaceStatus::ScreenshotSaved => write!(f, "Screenshot saved"),
            WorkspaceStatus::ScreenshotFailed => write!(f, "Screenshot failed"),
        }
    }
}

/// Broadcasts the current status to any number of observers.
#[derive(Debug)]
pub struct StatusSignal {
    tx: watch::Sender<WorkspaceStatus>,
}

impl Default for StatusSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WorkspaceStatus::Ready);
        Self { tx }
    }

    /// Overwrite the status. Observers see the change even when the value
    /// is unchanged.
    pub fn set(&self, status: WorkspaceStatus) {
        trace!(status = %status, "Status");
        self.tx.send_replace(status);
    }

    pub fn current(&self) -> WorkspaceStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkspaceStatus> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_texts() {
        assert_eq!(WorkspaceStatus::Ready.to_string(), "Ready");
        assert_eq!(
            WorkspaceStatus::Basemap(BasemapId::Dark).to_string(),
            "Basemap: dark"
        );
        assert_eq!(
            WorkspaceStatus::LoadingShapefile.to_string(),
            "Loading shapefile…"
        );
        assert_eq!(
            WorkspaceStatus::CapturingScreenshot.to_string(),
            "Capturing screenshot..."
        );
        assert_eq!(
            WorkspaceStatus::Located("Dortmund, Germany".into()).to_string(),
            "Dortmund, Germany"
        );
    }

    #[test]
    fn test_signal_starts_ready() {
        assert_eq!(StatusSignal::new().current(), WorkspaceStatus::Ready);
    }

    #[tokio::test]
    async fn test_subscribers_see_last_write() {
        let signal = StatusSignal::new();
        let mut rx = signal.subscribe();

        signal.set(WorkspaceStatus::Searching);
        signal.set(WorkspaceStatus::NoResults);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), WorkspaceStatus::NoResults);
    }
}
