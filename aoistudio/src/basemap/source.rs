//! Basemap identities and tile sources.
//!
//! The four background layers share the XYZ slippy-map scheme. The
//! orthophoto overlay is served by the NRW geobasis WMS and is queried per
//! visible tile with a GetMap request in EPSG:3857.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::coord::{project, tile_bounds, LatLon, TileCoord, TILE_SIZE_PX};

/// The mutually exclusive background layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasemapId {
    /// Standard OpenStreetMap rendering.
    Osm,
    /// CARTO Positron.
    Light,
    /// CARTO Dark Matter.
    Dark,
    /// OpenTopoMap.
    Topo,
}

impl BasemapId {
    /// Every basemap, in menu order.
    pub const ALL: [BasemapId; 4] = [
        BasemapId::Osm,
        BasemapId::Light,
        BasemapId::Dark,
        BasemapId::Topo,
    ];

    /// Short key used in events, status text and configuration.
    pub fn key(&self) -> &'static str {
        match self {
            BasemapId::Osm => "osm",
            BasemapId::Light => "light",
            BasemapId::Dark => "dark",
            BasemapId::Topo => "topo",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            BasemapId::Osm => "OpenStreetMap",
            BasemapId::Light => "Light",
            BasemapId::Dark => "Dark",
            BasemapId::Topo => "Topographic",
        }
    }

    /// Tile source serving this basemap.
    pub fn tile_source(&self) -> TileSource {
        match self {
            BasemapId::Osm => {
                TileSource::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", "abc", 19)
            }
            BasemapId::Light => TileSource::new(
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
                "abc",
                20,
            ),
            BasemapId::Dark => TileSource::new(
                "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
                "abc",
                20,
            ),
            BasemapId::Topo => {
                TileSource::new("https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png", "abc", 17)
            }
        }
    }
}

impl fmt::Display for BasemapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A key that names no known basemap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown basemap '{0}' (expected one of: osm, light, dark, topo)")]
pub struct UnknownBasemap(pub String);

impl FromStr for BasemapId {
    type Err = UnknownBasemap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasemapId::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBasemap(s.to_string()))
    }
}

/// XYZ tile source described by a URL template.
///
/// Supported placeholders: `{s}` subdomain, `{z}`/`{x}`/`{y}` tile address
/// and `{r}` retina suffix (always empty, tiles are requested at 1x).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    url_template: String,
    subdomains: Vec<char>,
    max_zoom: u8,
}

impl TileSource {
    pub fn new(url_template: impl Into<String>, subdomains: &str, max_zoom: u8) -> Self {
        Self {
            url_template: url_template.into(),
            subdomains: subdomains.chars().collect(),
            max_zoom,
        }
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Template with the subdomain and retina placeholders resolved, leaving
    /// only `{z}`, `{x}` and `{y}`.
    pub fn xyz_template(&self) -> String {
        let subdomain = self.subdomains.first().map(|c| c.to_string()).unwrap_or_default();
        self.url_template
            .replace("{s}", &subdomain)
            .replace("{r}", "")
    }

    /// URL of a single tile.
    ///
    /// Subdomains rotate on `(x + y) mod n` so neighbouring tiles spread
    /// across hosts.
    pub fn tile_url(&self, tile: &TileCoord) -> String {
        let subdomain = if self.subdomains.is_empty() {
            String::new()
        } else {
            let index = (tile.col as usize + tile.row as usize) % self.subdomains.len();
            self.subdomains[index].to_string()
        };

        self.url_template
            .replace("{s}", &subdomain)
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.col.to_string())
            .replace("{y}", &tile.row.to_string())
            .replace("{r}", "")
    }
}

/// Default orthophoto overlay endpoint (NRW digital orthophotos).
pub const DEFAULT_OVERLAY_ENDPOINT: &str = "https://www.wms.nrw.de/geobasis/wms_nw_dop?";

/// WMS layer backing the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmsSource {
    pub endpoint: String,
    pub layers: String,
    pub format: String,
    pub version: String,
    pub transparent: bool,
}

impl WmsSource {
    /// RGB digital orthophotos of North Rhine-Westphalia.
    pub fn nrw_dop() -> Self {
        Self {
            endpoint: DEFAULT_OVERLAY_ENDPOINT.to_string(),
            layers: "nw_dop_rgb".to_string(),
            format: "image/jpeg".to_string(),
            version: "1.3.0".to_string(),
            transparent: false,
        }
    }

    /// GetMap request covering one Web Mercator tile.
    pub fn get_map_url(&self, tile: &TileCoord) -> String {
        let bounds = tile_bounds(tile);
        let (min_x, min_y) = project(LatLon::new(bounds.south, bounds.west));
        let (max_x, max_y) = project(LatLon::new(bounds.north, bounds.east));
        let size = TILE_SIZE_PX as u32;

        // WMS 1.3.0 names the reference system CRS, earlier versions SRS
        let crs_param = if self.version.starts_with("1.3") {
            "crs"
        } else {
            "srs"
        };

        let separator = if self.endpoint.ends_with('?') || self.endpoint.ends_with('&') {
            ""
        } else if self.endpoint.contains('?') {
            "&"
        } else {
            "?"
        };

        format!(
            "{}{}service=WMS&request=GetMap&layers={}&styles=&format={}&transparent={}&version={}&width={}&height={}&{}=EPSG:3857&bbox={},{},{},{}",
            self.endpoint,
            separator,
            self.layers,
            self.format,
            self.transparent,
            self.version,
            size,
            size,
            crs_param,
            min_x,
            min_y,
            max_x,
            max_y
        )
    }
}

impl Default for WmsSource {
    fn default() -> Self {
        Self::nrw_dop()
    }
}
