//! Coordinate conversion module
//!
//! Geographic primitives shared by the workspace plus conversions between
//! latitude/longitude and Web Mercator tile coordinates used by the tiled
//! basemaps and the WMS overlay.

mod types;

pub use types::{Bounds, LatLon, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Earth radius used by the EPSG:3857 projection, in meters.
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Edge length of a basemap tile in pixels.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.col as f64 / n * 360.0 - 180.0;

    let y = tile.row as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Geographic bounds of a tile.
pub fn tile_bounds(tile: &TileCoord) -> Bounds {
    let (north, west) = tile_to_lat_lon(tile);
    let (south, east) = tile_to_lat_lon(&TileCoord {
        row: tile.row + 1,
        col: tile.col + 1,
        zoom: tile.zoom,
    });
    Bounds {
        south,
        west,
        north,
        east,
    }
}

/// Projects a position to EPSG:3857 meters as `(x, y)`.
///
/// Latitude is clamped to the Web Mercator limits first.
pub fn project(point: LatLon) -> (f64, f64) {
    let lat = point.lat.clamp(MIN_LAT, MAX_LAT);
    let x = MERCATOR_RADIUS_M * point.lon.to_radians();
    let y = MERCATOR_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Position in the unit square of the Web Mercator world, origin north-west.
fn normalized_mercator(point: LatLon) -> (f64, f64) {
    let lat = point.lat.clamp(MIN_LAT, MAX_LAT);
    let x = (point.lon + 180.0) / 360.0;
    let y = (1.0 - lat.to_radians().tan().asinh() / PI) / 2.0;
    (x, y)
}

/// Highest zoom level at which `bounds` fits inside a viewport of the given
/// pixel size.
///
/// Degenerate bounds (a single point) resolve to [`MAX_ZOOM`].
pub fn fit_zoom(bounds: &Bounds, width_px: u32, height_px: u32) -> u8 {
    let (west, north) = normalized_mercator(LatLon::new(bounds.north, bounds.west));
    let (east, south) = normalized_mercator(LatLon::new(bounds.south, bounds.east));

    let span_x = (east - west).abs() * TILE_SIZE_PX;
    let span_y = (south - north).abs() * TILE_SIZE_PX;

    let scale_x = if span_x > 0.0 {
        width_px as f64 / span_x
    } else {
        f64::INFINITY
    };
    let scale_y = if span_y > 0.0 {
        height_px as f64 / span_y
    } else {
        f64::INFINITY
    };

    let scale = scale_x.min(scale_y);
    if !scale.is_finite() {
        return MAX_ZOOM;
    }

    scale.log2().floor().clamp(MIN_ZOOM as f64, MAX_ZOOM as f64) as u8
}
