//! Workspace scenarios driven through the public API with the real codec
//! and file sink, and stubbed network collaborators.

use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aoistudio::aoi::{DrawnShape, FeatureCollection, Geometry};
use aoistudio::basemap::{BasemapId, Selection};
use aoistudio::codec::ZipShapefileConverter;
use aoistudio::config::WorkspaceConfig;
use aoistudio::coord::LatLon;
use aoistudio::export::{
    CaptureError, DirectorySink, SnapshotRenderer, SnapshotRequest, GEOJSON_FILENAME,
};
use aoistudio::geocode::{GeocodeError, Geocoder, SearchResult};
use aoistudio::surface::{HeadlessSurface, MapSurface};
use aoistudio::workspace::{Workspace, WorkspaceEvent, WorkspaceStatus};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

// =============================================================================
// Collaborators
// =============================================================================

/// Resolves "Dortmund" quickly; anything else fails after a long delay.
/// Counts every lookup it receives.
#[derive(Default)]
struct ScriptedGeocoder {
    lookups: Arc<AtomicUsize>,
}

impl Geocoder for ScriptedGeocoder {
    async fn lookup(&self, query: &str) -> Result<SearchResult, GeocodeError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if query == "Dortmund" {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(SearchResult {
                location: LatLon::new(51.51, 7.47),
                label: "Dortmund, Germany".to_string(),
            })
        } else {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Err(GeocodeError::Network("connection reset".to_string()))
        }
    }
}

struct BlankRenderer {
    fail: bool,
}

impl SnapshotRenderer for BlankRenderer {
    async fn render(&self, request: SnapshotRequest) -> Result<RgbaImage, CaptureError> {
        if self.fail {
            return Err(CaptureError::Render("canvas tainted".to_string()));
        }
        let (w, h) = request.pixel_size();
        Ok(RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0])))
    }
}

type TestWorkspace =
    Workspace<HeadlessSurface, ScriptedGeocoder, ZipShapefileConverter, BlankRenderer, DirectorySink>;

fn workspace_in(dir: PathBuf, renderer_fails: bool) -> TestWorkspace {
    workspace_counting(dir, renderer_fails).0
}

/// Workspace plus the geocoder's lookup counter.
fn workspace_counting(dir: PathBuf, renderer_fails: bool) -> (TestWorkspace, Arc<AtomicUsize>) {
    let config = WorkspaceConfig::default();
    let surface = HeadlessSurface::new(config.viewport());
    let geocoder = ScriptedGeocoder::default();
    let lookups = Arc::clone(&geocoder.lookups);
    let workspace = Workspace::new(
        config,
        surface,
        geocoder,
        ZipShapefileConverter::new(),
        BlankRenderer {
            fail: renderer_fails,
        },
        DirectorySink::new(dir),
    );
    (workspace, lookups)
}

// =============================================================================
// Archive fixtures
// =============================================================================

/// Point shapefile with the given (lon, lat) records.
fn point_shp(points: &[(f64, f64)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (index, (x, y)) in points.iter().enumerate() {
        body.extend_from_slice(&(index as i32 + 1).to_be_bytes());
        body.extend_from_slice(&10i32.to_be_bytes());
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&x.to_le_bytes());
        body.extend_from_slice(&y.to_le_bytes());
    }

    let mut file = Vec::new();
    file.extend_from_slice(&9994i32.to_be_bytes());
    file.extend_from_slice(&[0u8; 20]);
    file.extend_from_slice(&(((100 + body.len()) / 2) as i32).to_be_bytes());
    file.extend_from_slice(&1000i32.to_le_bytes());
    file.extend_from_slice(&1i32.to_le_bytes());
    for _ in 0..8 {
        file.extend_from_slice(&0f64.to_le_bytes());
    }
    file.extend_from_slice(&body);
    file
}

fn zip_of(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, payload) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(payload).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// =============================================================================
// Basemaps
// =============================================================================

#[tokio::test]
async fn basemap_event_switches_visible_layer() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);

    ws.dispatch(WorkspaceEvent::BasemapChosen("dark".into())).await;

    assert_eq!(ws.basemap_weight(BasemapId::Dark), Some(1.0));
    assert_eq!(ws.basemap_weight(BasemapId::Osm), Some(0.0));
    assert_eq!(ws.status().to_string(), "Basemap: dark");
    assert_eq!(ws.select_basemap("dark"), Selection::AlreadyActive);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn blank_search_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let (ws, lookups) = workspace_counting(temp.path().to_path_buf(), false);

    assert!(ws.search("").await.is_none());
    assert!(ws.search("   ").await.is_none());
    ws.dispatch(WorkspaceEvent::SearchSubmitted(String::new()))
        .await;

    assert_eq!(lookups.load(Ordering::SeqCst), 0);
    assert_eq!(ws.status(), WorkspaceStatus::MapReady);
    assert!(ws.marker().is_none());
}

#[tokio::test(start_paused = true)]
async fn successful_search_places_one_marker() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);

    ws.dispatch(WorkspaceEvent::SearchSubmitted("Dortmund".into()))
        .await;
    ws.dispatch(WorkspaceEvent::SearchSubmitted("Dortmund".into()))
        .await;

    let markers = ws.with_surface(|s| s.markers().to_vec());
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].position, LatLon::new(51.51, 7.47));
    assert_eq!(ws.status().to_string(), "Dortmund, Germany");
}

#[tokio::test(start_paused = true)]
async fn late_failure_keeps_earlier_marker() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);

    let (slow, fast) = tokio::join!(ws.search("Atlantis"), ws.search("Dortmund"));

    assert!(matches!(slow, Some(Err(GeocodeError::Network(_)))));
    assert!(matches!(fast, Some(Ok(_))));
    assert!(ws.marker().is_some());
    let markers = ws.with_surface(|s| s.markers().to_vec());
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].position, LatLon::new(51.51, 7.47));
    // The failure finished last.
    assert_eq!(ws.status(), WorkspaceStatus::SearchFailed);
}

// =============================================================================
// Import and export
// =============================================================================

#[tokio::test]
async fn zipped_shapefile_round_trips_to_geojson() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);
    let archive = zip_of(&[("sites/sites.shp", point_shp(&[(7.0, 51.0), (8.0, 52.0)]))]);
    let zip_path = temp.path().join("sites.zip");
    std::fs::write(&zip_path, archive).unwrap();

    ws.dispatch(WorkspaceEvent::FileSelected(zip_path)).await;

    assert_eq!(ws.status(), WorkspaceStatus::ShapefileLoaded);
    assert_eq!(ws.feature_count(), 2);
    let viewport = ws.with_surface(|s| s.viewport());
    assert!((viewport.center.lat - 51.5).abs() < 1e-9);
    assert!((viewport.center.lon - 7.5).abs() < 1e-9);

    let path = ws.export_geometry().await.unwrap();
    assert_eq!(path, temp.path().join(GEOJSON_FILENAME));

    let written: FeatureCollection =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(written, ws.document());
    assert_eq!(written.features[0].geometry, Geometry::Point([7.0, 51.0]));
    assert_eq!(ws.status(), WorkspaceStatus::GeoJsonExported);
}

#[tokio::test]
async fn archive_without_shapefile_fails_upload() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);

    let result = ws
        .import_archive(zip_of(&[("readme.txt", b"no layers".to_vec())]))
        .await;

    assert!(matches!(result, Some(Err(_))));
    assert_eq!(ws.status().to_string(), "Upload failed");
    assert_eq!(ws.feature_count(), 0);
}

#[tokio::test]
async fn drawn_shapes_precede_later_imports_in_document() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);

    ws.dispatch(WorkspaceEvent::DrawCompleted(DrawnShape::Marker(LatLon::new(
        50.0, 6.0,
    ))))
    .await;
    ws.import_archive(zip_of(&[("a.shp", point_shp(&[(9.0, 53.0)]))]))
        .await
        .unwrap()
        .unwrap();

    let first = ws.document();
    let second = ws.document();
    assert_eq!(first, second);
    assert_eq!(
        first
            .features
            .iter()
            .map(|f| f.geometry.clone())
            .collect::<Vec<_>>(),
        vec![Geometry::Point([6.0, 50.0]), Geometry::Point([9.0, 53.0])]
    );
}

// =============================================================================
// Snapshot
// =============================================================================

#[tokio::test]
async fn snapshot_writes_png() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), false);

    let path = ws.export_snapshot().await.unwrap();

    assert!(path.extension().is_some_and(|e| e == "png"));
    let image = image::open(&path).unwrap();
    assert_eq!((image.width(), image.height()), (1200, 800));
    assert_eq!(ws.status(), WorkspaceStatus::ScreenshotSaved);
    assert!(!ws.is_busy());
}

#[tokio::test]
async fn renderer_failure_leaves_state_untouched() {
    let temp = TempDir::new().unwrap();
    let ws = workspace_in(temp.path().to_path_buf(), true);
    ws.draw(DrawnShape::Marker(LatLon::new(50.0, 6.0)));
    ws.set_overlay_opacity(0.4);
    let before = ws.document();

    ws.dispatch(WorkspaceEvent::SnapshotRequested).await;

    assert_eq!(ws.status().to_string(), "Screenshot failed");
    assert_eq!(ws.document(), before);
    assert_eq!(ws.overlay_opacity(), 0.4);
    assert!(!ws.is_busy());
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}
