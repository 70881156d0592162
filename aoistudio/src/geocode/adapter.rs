//! Search adapter.
//!
//! Wraps a [`Geocoder`] and owns the single search marker. The lookup and
//! the marker replacement are separate steps so callers can apply the
//! result under their own surface lock once the lookup has resolved.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::client::{Geocoder, SearchResult};
use super::error::GeocodeError;
use crate::surface::{MapSurface, MarkerHandle};

/// Search front-end holding the live marker.
pub struct SearchAdapter<G> {
    geocoder: G,
    zoom: u8,
    fly_duration: Duration,
    marker: Mutex<Option<(MarkerHandle, SearchResult)>>,
}

impl<G: Geocoder> SearchAdapter<G> {
    pub fn new(geocoder: G, zoom: u8, fly_duration: Duration) -> Self {
        Self {
            geocoder,
            zoom,
            fly_duration,
            marker: Mutex::new(None),
        }
    }

    /// Returns `false` for empty or whitespace-only queries.
    pub fn accepts(query: &str) -> bool {
        !query.trim().is_empty()
    }

    /// Resolve `query` to its first candidate.
    pub async fn lookup(&self, query: &str) -> Result<SearchResult, GeocodeError> {
        debug!(query, "Geocoding");
        self.geocoder.lookup(query).await
    }

    /// Replace the search marker with one at `result` and fly there.
    pub fn apply<S: MapSurface>(&self, result: &SearchResult, surface: &mut S) {
        let mut marker = self.marker.lock();
        if let Some((previous, _)) = marker.take() {
            surface.remove_marker(previous);
        }

        let handle = surface.place_marker(result.location, &result.label);
        *marker = Some((handle, result.clone()));
        surface.fly_to(result.location, self.zoom, self.fly_duration);

        info!(location = %result.location, label = %result.label, "Search result placed");
    }

    /// The live marker, if a search has succeeded.
    pub fn marker(&self) -> Option<MarkerHandle> {
        self.marker.lock().as_ref().map(|(handle, _)| *handle)
    }

    /// The result the live marker shows.
    pub fn placed(&self) -> Option<SearchResult> {
        self.marker.lock().as_ref().map(|(_, result)| result.clone())
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::surface::{HeadlessSurface, Viewport};

    struct FixedGeocoder(Result<SearchResult, GeocodeError>);

    impl Geocoder for FixedGeocoder {
        async fn lookup(&self, _query: &str) -> Result<SearchResult, GeocodeError> {
            self.0.clone()
        }
    }

    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(Viewport {
            center: LatLon::new(51.5, 7.5),
            zoom: 9,
            width_px: 800,
            height_px: 600,
        })
    }

    fn result(lat: f64, lon: f64, label: &str) -> SearchResult {
        SearchResult {
            location: LatLon::new(lat, lon),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_blank_queries_rejected() {
        assert!(!SearchAdapter::<FixedGeocoder>::accepts(""));
        assert!(!SearchAdapter::<FixedGeocoder>::accepts("  \t\n"));
        assert!(SearchAdapter::<FixedGeocoder>::accepts(" Bonn "));
    }

    #[tokio::test]
    async fn test_lookup_delegates() {
        let adapter = SearchAdapter::new(
            FixedGeocoder(Err(GeocodeError::NoResults)),
            14,
            Duration::from_millis(2200),
        );
        assert_eq!(adapter.lookup("x").await, Err(GeocodeError::NoResults));
        assert!(adapter.marker().is_none());
    }

    #[test]
    fn test_apply_replaces_marker_and_flies() {
        let adapter = SearchAdapter::new(
            FixedGeocoder(Err(GeocodeError::NoResults)),
            14,
            Duration::from_millis(2200),
        );
        let mut surface = surface();

        adapter.apply(&result(50.94, 6.96, "Köln"), &mut surface);
        adapter.apply(&result(51.51, 7.47, "Dortmund, Germany"), &mut surface);

        assert_eq!(surface.markers().len(), 1);
        assert_eq!(surface.markers()[0].label, "Dortmund, Germany");
        assert_eq!(adapter.marker(), Some(surface.markers()[0].handle));
        assert_eq!(adapter.placed().unwrap().label, "Dortmund, Germany");

        let viewport = surface.viewport();
        assert_eq!(viewport.center, LatLon::new(51.51, 7.47));
        assert_eq!(viewport.zoom, 14);
    }
}
