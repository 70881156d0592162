//! Snapshot rasterizer built on `staticmap`.
//!
//! Renders the viewport from the visible basemap's tiles and draws the AOI
//! features and the search marker on top in the default draw style.
//! The orthophoto overlay is not part of the raster.

use staticmap::tools::Tool;
use staticmap::{lat_to_y, lon_to_x, Bounds, StaticMapBuilder};
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, PixmapMut, Shader, Stroke, Transform};
use tracing::debug;

use super::error::CaptureError;
use super::snapshot::{SnapshotRenderer, SnapshotRequest};
use crate::aoi::{Geometry, Position};
use crate::coord::LatLon;

/// Stroke colour of drawn features (`#3388ff`).
pub const FEATURE_STROKE_RGB: (u8, u8, u8) = (0x33, 0x88, 0xff);
/// Stroke width of drawn features in pixels.
pub const FEATURE_STROKE_WIDTH: f32 = 3.0;
/// Fill opacity of polygon features.
pub const FEATURE_FILL_OPACITY: f32 = 0.2;
/// Radius of point features in pixels.
const POINT_RADIUS: f32 = 6.0;
/// Radius of the search marker in pixels.
const MARKER_RADIUS: f32 = 8.0;

fn solid(r: u8, g: u8, b: u8, a: u8) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(Color::from_rgba8(r, g, b, a)),
        anti_alias: true,
        ..Default::default()
    }
}

/// One feature geometry drawn as a staticmap tool.
pub struct FeatureShape {
    geometry: Geometry,
    extent: (f64, f64, f64, f64),
    stroke: Paint<'static>,
    fill: Paint<'static>,
}

impl FeatureShape {
    /// Returns `None` for geometries without positions.
    pub fn new(geometry: Geometry) -> Option<Self> {
        let bounds = geometry.bounds()?;
        let (r, g, b) = FEATURE_STROKE_RGB;
        Some(Self {
            geometry,
            extent: (bounds.west, bounds.south, bounds.east, bounds.north),
            stroke: solid(r, g, b, 255),
            fill: solid(r, g, b, (FEATURE_FILL_OPACITY * 255.0).round() as u8),
        })
    }

    fn stroke_path(&self, pixmap: &mut PixmapMut, path: &Path) {
        pixmap.stroke_path(
            path,
            &self.stroke,
            &Stroke {
                width: FEATURE_STROKE_WIDTH,
                ..Default::default()
            },
            Transform::default(),
            None,
        );
    }

    fn draw_point(&self, pixmap: &mut PixmapMut, bounds: &Bounds, position: Position) {
        let (x, y) = to_px(bounds, position);
        if let Some(circle) = PathBuilder::from_circle(x, y, POINT_RADIUS) {
            pixmap.fill_path(
                &circle,
                &self.fill,
                FillRule::Winding,
                Transform::default(),
                None,
            );
            self.stroke_path(pixmap, &circle);
        }
    }

    fn draw_line(&self, pixmap: &mut PixmapMut, bounds: &Bounds, line: &[Position]) {
        if let Some(path) = trace_path(bounds, std::iter::once(line), false) {
            self.stroke_path(pixmap, &path);
        }
    }

    fn draw_polygon(&self, pixmap: &mut PixmapMut, bounds: &Bounds, rings: &[Vec<Position>]) {
        let Some(path) = trace_path(bounds, rings.iter().map(Vec::as_slice), true) else {
            return;
        };
        // Even-odd so inner rings punch holes
        pixmap.fill_path(
            &path,
            &self.fill,
            FillRule::EvenOdd,
            Transform::default(),
            None,
        );
        self.stroke_path(pixmap, &path);
    }
}

fn to_px(bounds: &Bounds, position: Position) -> (f32, f32) {
    let [lon, lat] = position;
    (
        bounds.x_to_px(lon_to_x(lon, bounds.zoom)) as f32,
        bounds.y_to_px(lat_to_y(lat, bounds.zoom)) as f32,
    )
}

fn trace_path<'a>(
    bounds: &Bounds,
    parts: impl Iterator<Item = &'a [Position]>,
    close: bool,
) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for part in parts {
        let mut points = part.iter().map(|p| to_px(bounds, *p));
        let Some((x, y)) = points.next() else {
            continue;
        };
        builder.move_to(x, y);
        for (x, y) in points {
            builder.line_to(x, y);
        }
        if close {
            builder.close();
        }
    }
    builder.finish()
}

impl Tool for FeatureShape {
    fn extent(&self, _zoom: u8, _tile_size: f64) -> (f64, f64, f64, f64) {
        self.extent
    }

    fn draw(&self, bounds: &Bounds, mut pixmap: PixmapMut) {
        match &self.geometry {
            Geometry::Point(p) => self.draw_point(&mut pixmap, bounds, *p),
            Geometry::MultiPoint(points) => {
                for p in points {
                    self.draw_point(&mut pixmap, bounds, *p);
                }
            }
            Geometry::LineString(line) => self.draw_line(&mut pixmap, bounds, line),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.draw_line(&mut pixmap, bounds, line);
                }
            }
            Geometry::Polygon(rings) => self.draw_polygon(&mut pixmap, bounds, rings),
            Geometry::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.draw_polygon(&mut pixmap, bounds, rings);
                }
            }
        }
    }
}

/// The search marker: a filled pin head with a white rim.
pub struct MarkerPin {
    at: LatLon,
    fill: Paint<'static>,
    rim: Paint<'static>,
}

impl MarkerPin {
    pub fn new(at: LatLon) -> Self {
        let (r, g, b) = FEATURE_STROKE_RGB;
        Self {
            at,
            fill: solid(r, g, b, 255),
            rim: solid(255, 255, 255, 255),
        }
    }
}

impl Tool for MarkerPin {
    fn extent(&self, _zoom: u8, _tile_size: f64) -> (f64, f64, f64, f64) {
        (self.at.lon, self.at.lat, self.at.lon, self.at.lat)
    }

    fn draw(&self, bounds: &Bounds, mut pixmap: PixmapMut) {
        let (x, y) = to_px(bounds, self.at.to_position());
        if let Some(circle) = PathBuilder::from_circle(x, y, MARKER_RADIUS) {
            pixmap.fill_path(
                &circle,
                &self.fill,
                FillRule::Winding,
                Transform::default(),
                None,
            );
            pixmap.stroke_path(
                &circle,
                &self.rim,
                &Stroke {
                    width: 2.0,
                    ..Default::default()
                },
                Transform::default(),
                None,
            );
        }
    }
}

/// Rasterizer fetching basemap tiles with `staticmap`.
///
/// Tile downloads are blocking, so rendering runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMapRenderer;

impl StaticMapRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous rendering.
    pub fn render_blocking(request: &SnapshotRequest) -> Result<image::RgbaImage, CaptureError> {
        let (width, height) = request.pixel_size();
        let zoom = request.viewport.zoom.min(request.basemap_max_zoom);

        let mut map = StaticMapBuilder::default()
            .width(width)
            .height(height)
            .zoom(zoom)
            .lat_center(request.viewport.center.lat)
            .lon_center(request.viewport.center.lon)
            .url_template(request.basemap_template.as_str())
            .build()
            .map_err(|e| CaptureError::Render(format!("Failed to create map: {}", e)))?;

        for feature in &request.features {
            if let Some(shape) = FeatureShape::new(feature.geometry.clone()) {
                map.add_tool(shape);
            }
        }
        if let Some(marker) = &request.marker {
            map.add_tool(MarkerPin::new(marker.location));
        }

        let png = map
            .encode_png()
            .map_err(|e| CaptureError::Render(e.to_string()))?;

        debug!(
            width,
            height,
            zoom,
            features = request.features.len(),
            bytes = png.len(),
            "Static map rendered"
        );

        image::load_from_memory(&png)
            .map(|img| img.to_rgba8())
            .map_err(|e| CaptureError::Render(format!("Failed to decode raster: {}", e)))
    }
}

impl SnapshotRenderer for StaticMapRenderer {
    async fn render(&self, request: SnapshotRequest) -> Result<image::RgbaImage, CaptureError> {
        tokio::task::spawn_blocking(move || Self::render_blocking(&request))
            .await
            .map_err(|e| CaptureError::Render(format!("render task failed: {}", e)))?
    }
}
