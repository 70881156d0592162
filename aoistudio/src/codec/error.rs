//! Import error types.

use thiserror::Error;

/// Errors that can occur while decoding an uploaded archive.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not a readable zip archive.
    #[error("Not a valid zip archive: {0}")]
    InvalidArchive(String),

    /// The archive holds no `.shp` member.
    #[error("Archive contains no shapefile layer")]
    NoGeometryLayer,

    /// A layer could not be converted.
    #[error("Failed to convert layer '{layer}': {reason}")]
    Conversion { layer: String, reason: String },

    /// The upload could not be read.
    #[error("Failed to read upload: {0}")]
    Read(#[from] std::io::Error),
}
