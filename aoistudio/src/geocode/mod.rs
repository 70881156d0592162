//! Free-text place search.

mod adapter;
mod client;
mod error;

pub use adapter::SearchAdapter;
pub use client::{Geocoder, NominatimGeocoder, SearchResult};
pub use error::GeocodeError;
