//! Export pipeline.
//!
//! Turns the AOI document into a GeoJSON download and the current view into
//! a PNG snapshot. Neither path touches workspace state.

mod error;
mod sink;
mod snapshot;
mod static_map;

pub use error::{CaptureError, ExportError};
pub use sink::{Artifact, DirectorySink, DownloadSink, MemorySink};
pub use snapshot::{
    encode_png, flatten, snapshot_filename, CaptureOptions, SnapshotRenderer, SnapshotRequest,
    PNG_MEDIA_TYPE,
};
pub use static_map::{
    FeatureShape, MarkerPin, StaticMapRenderer, FEATURE_FILL_OPACITY, FEATURE_STROKE_RGB,
    FEATURE_STROKE_WIDTH,
};

use std::path::PathBuf;

use tracing::debug;

use crate::aoi::FeatureCollection;
use crate::codec::{encode_document, GEOJSON_MEDIA_TYPE};

/// Filename of geometry exports.
pub const GEOJSON_FILENAME: &str = "aoi.geojson";

/// Renderer and sink pair.
pub struct ExportPipeline<R, D> {
    renderer: R,
    sink: D,
}

impl<R: SnapshotRenderer, D: DownloadSink> ExportPipeline<R, D> {
    pub fn new(renderer: R, sink: D) -> Self {
        Self { renderer, sink }
    }

    /// Encode `document` and deliver it as `aoi.geojson`.
    pub async fn export_geometry(
        &self,
        document: &FeatureCollection,
    ) -> Result<PathBuf, ExportError> {
        let artifact = Artifact {
            filename: GEOJSON_FILENAME.to_string(),
            media_type: GEOJSON_MEDIA_TYPE,
            bytes: encode_document(document),
        };
        debug!(
            features = document.len(),
            bytes = artifact.bytes.len(),
            "Geometry encoded"
        );
        self.sink.deliver(artifact).await
    }

    /// Rasterize, flatten onto the background, PNG-encode and deliver.
    pub async fn export_snapshot(&self, request: SnapshotRequest) -> Result<PathBuf, CaptureError> {
        let background = request.options.background;
        let raster = self.renderer.render(request).await?;

        let png = encode_png(&flatten(&raster, background))?;
        let artifact = Artifact {
            filename: snapshot_filename(chrono::Utc::now().timestamp_millis()),
            media_type: PNG_MEDIA_TYPE,
            bytes: png,
        };
        debug!(
            width = raster.width(),
            height = raster.height(),
            bytes = artifact.bytes.len(),
            "Snapshot encoded"
        );

        Ok(self.sink.deliver(artifact).await?)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::{Feature, Geometry};
    use crate::coord::LatLon;
    use crate::surface::Viewport;
    use image::{Rgba, RgbaImage};

    struct SolidRenderer;

    impl SnapshotRenderer for SolidRenderer {
        async fn render(&self, request: SnapshotRequest) -> Result<RgbaImage, CaptureError> {
            let (w, h) = request.pixel_size();
            Ok(RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0])))
        }
    }

    struct BrokenRenderer;

    impl SnapshotRenderer for BrokenRenderer {
        async fn render(&self, _request: SnapshotRequest) -> Result<RgbaImage, CaptureError> {
            Err(CaptureError::Render("surface lost".into()))
        }
    }

    fn request() -> SnapshotRequest {
        SnapshotRequest {
            viewport: Viewport {
                center: LatLon::new(51.5, 7.5),
                zoom: 9,
                width_px: 16,
                height_px: 8,
            },
            basemap_template: "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            basemap_max_zoom: 19,
            overlay_opacity: 0.0,
            features: Vec::new(),
            marker: None,
            options: CaptureOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_export_geometry_delivers_geojson() {
        let pipeline = ExportPipeline::new(SolidRenderer, MemorySink::new());
        let document = FeatureCollection {
            features: vec![Feature::new(Geometry::Point([7.47, 51.51]))],
        };

        let path = pipeline.export_geometry(&document).await.unwrap();

        assert_eq!(path, PathBuf::from("aoi.geojson"));
        let delivered = pipeline.sink().delivered();
        assert_eq!(delivered[0].media_type, "application/json");
        let parsed: FeatureCollection = serde_json::from_slice(&delivered[0].bytes).unwrap();
        assert_eq!(parsed, document);
    }

    #[tokio::test]
    async fn test_export_snapshot_is_white_png() {
        let pipeline = ExportPipeline::new(SolidRenderer, MemorySink::new());

        let path = pipeline.export_snapshot(request()).await.unwrap();

        let name = path.to_string_lossy().to_string();
        assert!(name.starts_with("map-screenshot-") && name.ends_with(".png"));

        let artifact = &pipeline.sink().delivered()[0];
        assert_eq!(artifact.media_type, "image/png");
        let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert!(decoded.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[tokio::test]
    async fn test_render_failure_delivers_nothing() {
        let pipeline = ExportPipeline::new(BrokenRenderer, MemorySink::new());

        let result = pipeline.export_snapshot(request()).await;

        assert!(matches!(result, Err(CaptureError::Render(_))));
        assert!(pipeline.sink().delivered().is_empty());
    }
}
