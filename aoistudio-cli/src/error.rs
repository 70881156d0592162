//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use aoistudio::codec::ImportError;
use aoistudio::export::{CaptureError, ExportError};
use aoistudio::geocode::GeocodeError;
use aoistudio::http::HttpError;

use crate::config_file::ConfigFileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Bad command-line value
    InvalidArgument(String),
    /// Failed to create the HTTP client
    Http(HttpError),
    /// Shapefile import failed
    Import(ImportError),
    /// Another import or capture was in flight
    Busy,
    /// Place search failed
    Search(GeocodeError),
    /// GeoJSON export failed
    Export(ExportError),
    /// Snapshot capture failed
    Capture(CaptureError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Import(ImportError::NoGeometryLayer) => {
                eprintln!();
                eprintln!("The archive must contain at least one .shp file.");
                eprintln!("Attribute tables (.dbf) next to it are picked up automatically.");
            }
            CliError::Search(GeocodeError::Network(_)) => {
                eprintln!();
                eprintln!("Check your network connection or set a different endpoint:");
                eprintln!("  aoistudio config show   (see [geocoder] endpoint)");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }

    /// Process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) | CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Http(e) => write!(f, "{}", e),
            CliError::Import(e) => write!(f, "Upload failed: {}", e),
            CliError::Busy => write!(f, "Workspace is busy"),
            CliError::Search(GeocodeError::NoResults) => write!(f, "No results"),
            CliError::Search(e) => write!(f, "Search failed: {}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
            CliError::Capture(e) => write!(f, "Screenshot failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Http(e) => Some(e),
            CliError::Import(e) => Some(e),
            CliError::Search(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::Capture(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Http(e)
    }
}
