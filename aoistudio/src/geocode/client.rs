//! Geocoder trait and Nominatim implementation.
//!
//! The [`Geocoder`] trait abstracts over free-text place search services.
//! [`NominatimGeocoder`] queries the OpenStreetMap Nominatim search API
//! through any [`AsyncHttpClient`].

use std::future::Future;

use serde::Deserialize;

use super::error::GeocodeError;
use crate::config::DEFAULT_GEOCODER_ENDPOINT;
use crate::coord::LatLon;
use crate::http::AsyncHttpClient;

/// A resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub location: LatLon,
    /// Human-readable label, shown on the marker and as status.
    pub label: String,
}

/// Trait for resolving a free-text query to a place.
///
/// Implementations return the first candidate of the provider's ranking.
pub trait Geocoder: Send + Sync {
    fn lookup(&self, query: &str)
        -> impl Future<Output = Result<SearchResult, GeocodeError>> + Send;
}

/// One entry of a Nominatim `format=json` response.
///
/// Nominatim encodes coordinates as strings; plain numbers are accepted too.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Coordinate,
    lon: Coordinate,
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn value(&self, field: &str) -> Result<f64, GeocodeError> {
        match self {
            Coordinate::Number(v) => Ok(*v),
            Coordinate::Text(s) => s.trim().parse().map_err(|_| {
                GeocodeError::InvalidResponse(format!("{} is not a number: '{}'", field, s))
            }),
        }
    }
}

/// Geocoder backed by the Nominatim search API.
pub struct NominatimGeocoder<C> {
    client: C,
    endpoint: String,
}

impl<C: AsyncHttpClient> NominatimGeocoder<C> {
    /// Create a geocoder against the public Nominatim instance.
    pub fn new(client: C) -> Self {
        Self::with_endpoint(client, DEFAULT_GEOCODER_ENDPOINT)
    }

    pub fn with_endpoint(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the lookup URL for `query`.
    ///
    /// The query is sent exactly as given.
    pub fn search_url(&self, query: &str) -> Result<String, GeocodeError> {
        reqwest::Url::parse_with_params(&self.endpoint, &[("format", "json"), ("q", query)])
            .map(String::from)
            .map_err(|e| GeocodeError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })
    }
}

/// Decode a Nominatim response and keep the first candidate.
fn first_place(body: &[u8]) -> Result<SearchResult, GeocodeError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_slice(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    let place = places.into_iter().next().ok_or(GeocodeError::NoResults)?;
    let lat = place.lat.value("lat")?;
    let lon = place.lon.value("lon")?;

    Ok(SearchResult {
        location: LatLon::new(lat, lon),
        label: place.display_name,
    })
}

impl<C: AsyncHttpClient> Geocoder for NominatimGeocoder<C> {
    async fn lookup(&self, query: &str) -> Result<SearchResult, GeocodeError> {
        let url = self.search_url(query)?;
        let body = self
            .client
            .get_with_headers(&url, &[("Accept", "application/json")])
            .await?;

        let result = first_place(&body);
        tracing::debug!(
            query,
            bytes = body.len(),
            found = result.is_ok(),
            "Geocoder response received"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockAsyncHttpClient;
    use crate::http::HttpError;

    const DORTMUND: &str = r#"[
        {"place_id": 1, "lat": "51.51", "lon": "7.47", "display_name": "Dortmund, Germany"},
        {"place_id": 2, "lat": "40.0", "lon": "-80.0", "display_name": "Dortmund, Elsewhere"}
    ]"#;

    #[test]
    fn test_search_url_encodes_query() {
        let geocoder = NominatimGeocoder::new(MockAsyncHttpClient::responding(Ok(vec![])));
        let url = geocoder.search_url("Köln Dom").unwrap();

        assert_eq!(
            url,
            "https://nominatim.openstreetmap.org/search?format=json&q=K%C3%B6ln+Dom"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let geocoder =
            NominatimGeocoder::with_endpoint(MockAsyncHttpClient::responding(Ok(vec![])), "nope");
        assert!(matches!(
            geocoder.search_url("x"),
            Err(GeocodeError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_takes_first_candidate() {
        let client = MockAsyncHttpClient::responding(Ok(DORTMUND.as_bytes().to_vec()));
        let geocoder = NominatimGeocoder::new(client.clone());

        let result = geocoder.lookup("Dortmund").await.unwrap();

        assert_eq!(result.location, LatLon::new(51.51, 7.47));
        assert_eq!(result.label, "Dortmund, Germany");
        assert_eq!(client.requested_urls().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_empty_list_is_no_results() {
        let geocoder = NominatimGeocoder::new(MockAsyncHttpClient::responding(Ok(b"[]".to_vec())));
        assert_eq!(
            geocoder.lookup("Atlantis").await,
            Err(GeocodeError::NoResults)
        );
    }

    #[tokio::test]
    async fn test_lookup_network_failure() {
        let geocoder = NominatimGeocoder::new(MockAsyncHttpClient::responding(Err(
            HttpError::Request("connection refused".into()),
        )));
        assert!(matches!(
            geocoder.lookup("Dortmund").await,
            Err(GeocodeError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_garbage_body() {
        let geocoder =
            NominatimGeocoder::new(MockAsyncHttpClient::responding(Ok(b"<html>".to_vec())));
        assert!(matches!(
            geocoder.lookup("Dortmund").await,
            Err(GeocodeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_numeric_coordinates_accepted() {
        let body = br#"[{"lat": 48.1, "lon": 11.5, "display_name": "Munich"}]"#;
        let result = first_place(body).unwrap();
        assert_eq!(result.location, LatLon::new(48.1, 11.5));
    }

    #[test]
    fn test_unparseable_coordinate() {
        let body = br#"[{"lat": "north", "lon": "7", "display_name": "X"}]"#;
        assert!(matches!(
            first_place(body),
            Err(GeocodeError::InvalidResponse(_))
        ));
    }
}
