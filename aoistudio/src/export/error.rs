//! Export error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while delivering an artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while capturing a snapshot.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The rasterizer failed.
    #[error("Rendering failed: {0}")]
    Render(String),

    /// The raster could not be encoded.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// The encoded snapshot could not be delivered.
    #[error(transparent)]
    Delivery(#[from] ExportError),
}
