//! Default values for workspace settings.
//!
//! The initial view is centred on North Rhine-Westphalia, where the
//! orthophoto overlay has coverage.

use std::time::Duration;

use crate::basemap::BasemapId;
use crate::coord::LatLon;

/// Initial map centre.
pub const DEFAULT_CENTER: LatLon = LatLon::new(51.5, 7.5);

/// Initial zoom level.
pub const DEFAULT_ZOOM: u8 = 9;

/// Viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1200;

/// Viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

/// Basemap visible after initialization.
pub const DEFAULT_BASEMAP: BasemapId = BasemapId::Osm;

/// Zoom level of the cache-warming prefetch pass.
pub const DEFAULT_PREFETCH_ZOOM: u8 = 5;

/// Tiles per side of the prefetch grid (4 → 16 tiles per basemap).
pub const DEFAULT_PREFETCH_GRID: u32 = 4;

/// Zoom level the view flies to after a successful search.
pub const DEFAULT_SEARCH_ZOOM: u8 = 14;

/// Duration of the fly-to transition after a search.
pub const DEFAULT_FLY_DURATION: Duration = Duration::from_millis(2200);

/// Public Nominatim search endpoint.
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
