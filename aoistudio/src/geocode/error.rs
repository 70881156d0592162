//! Error types for geocoding lookups.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur during a place lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// The service could not be reached or answered with an error status.
    #[error("Geocoder request failed: {0}")]
    Network(String),

    /// The service answered with an empty candidate list.
    #[error("No results")]
    NoResults,

    /// The response body could not be decoded into candidates.
    #[error("Failed to parse geocoder response: {0}")]
    InvalidResponse(String),

    /// The configured endpoint is not a valid URL.
    #[error("Invalid geocoder endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl From<HttpError> for GeocodeError {
    fn from(e: HttpError) -> Self {
        GeocodeError::Network(e.to_string())
    }
}
