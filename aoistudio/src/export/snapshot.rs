//! Snapshot capture types and raster post-processing.

use std::future::Future;
use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage, RgbaImage};

use super::error::CaptureError;
use crate::aoi::Feature;
use crate::geocode::SearchResult;
use crate::surface::Viewport;

/// Media type of snapshot artifacts.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Rendering constraints for a capture.
///
/// The defaults describe a deterministic capture: no transitions, no
/// animations, no shadows, device scale 1 on a white background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    pub transitions: bool,
    pub animations: bool,
    pub shadows: bool,
    pub scale: f32,
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            transitions: false,
            animations: false,
            shadows: false,
            scale: 1.0,
            background: [255, 255, 255],
        }
    }
}

/// Everything a renderer needs to reproduce the visible map.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRequest {
    pub viewport: Viewport,
    /// XYZ template of the visible basemap.
    pub basemap_template: String,
    pub basemap_max_zoom: u8,
    pub overlay_opacity: f64,
    pub features: Vec<Feature>,
    pub marker: Option<SearchResult>,
    pub options: CaptureOptions,
}

impl SnapshotRequest {
    /// Output size in pixels after applying the capture scale.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = if self.options.scale > 0.0 {
            self.options.scale
        } else {
            1.0
        };
        (
            ((self.viewport.width_px as f32 * scale).round() as u32).max(1),
            ((self.viewport.height_px as f32 * scale).round() as u32).max(1),
        )
    }
}

/// Trait for rasterizing the current map view.
pub trait SnapshotRenderer: Send + Sync {
    fn render(
        &self,
        request: SnapshotRequest,
    ) -> impl Future<Output = Result<RgbaImage, CaptureError>> + Send;
}

/// Composite an RGBA raster over an opaque background.
pub fn flatten(raster: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
        let [r, g, b, a] = raster.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8, bg: u8| ((c as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

/// PNG-encode an opaque raster.
pub fn encode_png(raster: &RgbImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Cursor::new(Vec::new());
    raster
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// `map-screenshot-<unix-ms>.png`
pub fn snapshot_filename(timestamp_ms: i64) -> String {
    format!("map-screenshot-{}.png", timestamp_ms)
}
