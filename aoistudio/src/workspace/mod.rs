//! Workspace controller.
//!
//! One [`Workspace`] per session owns the basemap registry, the AOI store
//! and the search marker, and routes each [`WorkspaceEvent`] to exactly one
//! operation. Every outcome maps to one [`WorkspaceStatus`]; errors are
//! logged and never handed back to the event source.
//!
//! Mutations happen under short `parking_lot` locks that are released
//! before any `.await`, so interleaved operations on a current-thread
//! runtime each apply their effects atomically. Concurrent searches and
//! status updates are last-writer-wins.

mod event;
mod gate;
mod status;

pub use event::WorkspaceEvent;
pub use gate::{BusyGate, BusyGuard};
pub use status::{StatusSignal, WorkspaceStatus};

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::aoi::{AoiStore, DrawnShape, Feature, FeatureCollection, FeatureId, ImportBatch};
use crate::basemap::{BasemapId, BasemapRegistry, Selection};
use crate::codec::{GeometryCodec, ImportError, ShapefileConverter};
use crate::config::WorkspaceConfig;
use crate::export::{
    CaptureError, CaptureOptions, DownloadSink, ExportError, ExportPipeline, SnapshotRenderer,
    SnapshotRequest,
};
use crate::geocode::{GeocodeError, Geocoder, SearchAdapter, SearchResult};
use crate::surface::{MapSurface, MarkerHandle};

/// Interactive AOI workspace.
pub struct Workspace<S, G, C, R, D> {
    config: WorkspaceConfig,
    surface: Mutex<S>,
    registry: Mutex<BasemapRegistry>,
    store: Mutex<AoiStore>,
    search: SearchAdapter<G>,
    codec: GeometryCodec<C>,
    export: ExportPipeline<R, D>,
    status: StatusSignal,
    gate: BusyGate,
}

impl<S, G, C, R, D> Workspace<S, G, C, R, D>
where
    S: MapSurface,
    G: Geocoder,
    C: ShapefileConverter,
    R: SnapshotRenderer,
    D: DownloadSink,
{
    /// Build the workspace and initialize the map.
    ///
    /// Creates every basemap layer and the overlay on `surface`, requests
    /// the prefetch grid, and leaves the status at `Map ready`.
    pub fn new(
        config: WorkspaceConfig,
        mut surface: S,
        geocoder: G,
        converter: C,
        renderer: R,
        sink: D,
    ) -> Self {
        let status = StatusSignal::new();

        let registry = BasemapRegistry::initialize(&mut surface, &config);
        registry.prefetch(&mut surface, config.prefetch_zoom(), config.prefetch_grid());

        let search = SearchAdapter::new(geocoder, config.search_zoom(), config.fly_duration());

        status.set(WorkspaceStatus::MapReady);
        info!(
            basemap = %registry.active(),
            center = %config.center(),
            zoom = config.zoom(),
            "Workspace ready"
        );

        Self {
            config,
            surface: Mutex::new(surface),
            registry: Mutex::new(registry),
            store: Mutex::new(AoiStore::new()),
            search,
            codec: GeometryCodec::new(converter),
            export: ExportPipeline::new(renderer, sink),
            status,
            gate: BusyGate::new(),
        }
    }

    /// Route an event to its operation.
    pub async fn dispatch(&self, event: WorkspaceEvent) {
        debug!(event = ?EventKind(&event), "Dispatching event");
        match event {
            WorkspaceEvent::DrawCompleted(shape) => {
                self.draw(shape);
            }
            WorkspaceEvent::FileSelected(path) => {
                self.import_file(&path).await;
            }
            WorkspaceEvent::ArchiveLoaded(bytes) => {
                self.import_archive(bytes).await;
            }
            WorkspaceEvent::BasemapChosen(key) => {
                self.select_basemap(&key);
            }
            WorkspaceEvent::OpacityChanged(value) => {
                self.set_overlay_opacity(value);
            }
            WorkspaceEvent::SearchSubmitted(query) => {
                self.search(&query).await;
            }
            // Failures already set the status and were logged at warn.
            WorkspaceEvent::ExportGeometryRequested => {
                if let Err(e) = self.export_geometry().await {
                    debug!(error = %e, "Geometry export event finished with error");
                }
            }
            WorkspaceEvent::SnapshotRequested => {
                if let Err(e) = self.export_snapshot().await {
                    debug!(error = %e, "Snapshot event finished with error");
                }
            }
        }
    }

    // =========================================================================
    // Basemaps
    // =========================================================================

    /// Switch the visible basemap by key.
    ///
    /// Unknown and unregistered keys change nothing, status included.
    pub fn select_basemap(&self, key: &str) -> Selection {
        let Ok(id) = key.parse::<BasemapId>() else {
            debug!(key, "Ignoring unknown basemap key");
            return Selection::Unregistered;
        };

        let outcome = {
            let mut registry = self.registry.lock();
            let mut surface = self.surface.lock();
            registry.select(id, &mut *surface)
        };

        if let Selection::Switched { to, .. } = outcome {
            self.status.set(WorkspaceStatus::Basemap(to));
        }
        outcome
    }

    /// Set the overlay opacity. Returns the clamped value applied.
    pub fn set_overlay_opacity(&self, value: f64) -> f64 {
        let mut registry = self.registry.lock();
        let mut surface = self.surface.lock();
        registry.set_overlay_opacity(value, &mut *surface)
    }

    // =========================================================================
    // Drawing and import
    // =========================================================================

    /// Normalize and add a shape completed by the draw tool.
    pub fn draw(&self, shape: DrawnShape) -> FeatureId {
        self.add_drawn(shape.into_feature())
    }

    /// Add a drawn feature as-is.
    pub fn add_drawn(&self, feature: Feature) -> FeatureId {
        self.surface
            .lock()
            .show_features(std::slice::from_ref(&feature));
        let id = self.store.lock().add_from_draw(feature);

        self.status.set(WorkspaceStatus::AoiAdded);
        id
    }

    /// Read an archive from disk and import it.
    ///
    /// Returns `None` when the import was rejected because another import
    /// or a capture is in flight.
    pub async fn import_file(&self, path: &Path) -> Option<Result<ImportBatch, ImportError>> {
        let Some(_guard) = self.gate.try_begin_import() else {
            debug!(path = %path.display(), "Import rejected: workspace busy");
            return None;
        };
        self.status.set(WorkspaceStatus::LoadingShapefile);

        let result = match tokio::fs::read(path).await {
            Ok(bytes) => self.load_archive(bytes).await,
            Err(e) => Err(ImportError::Read(e)),
        };
        Some(self.finish_import(result))
    }

    /// Import archive bytes.
    ///
    /// Returns `None` when the import was rejected because another import
    /// or a capture is in flight.
    pub async fn import_archive(&self, bytes: Vec<u8>) -> Option<Result<ImportBatch, ImportError>> {
        let Some(_guard) = self.gate.try_begin_import() else {
            debug!(bytes = bytes.len(), "Import rejected: workspace busy");
            return None;
        };
        self.status.set(WorkspaceStatus::LoadingShapefile);

        let result = self.load_archive(bytes).await;
        Some(self.finish_import(result))
    }

    async fn load_archive(&self, bytes: Vec<u8>) -> Result<ImportBatch, ImportError> {
        let features = self.codec.decode_archive(bytes).await?;

        self.surface.lock().show_features(&features);
        let batch = self.store.lock().add_from_import(features);

        if let Some(bounds) = batch.bounds {
            self.surface.lock().fit_bounds(bounds);
        }
        Ok(batch)
    }

    fn finish_import(
        &self,
        result: Result<ImportBatch, ImportError>,
    ) -> Result<ImportBatch, ImportError> {
        match &result {
            Ok(batch) => {
                info!(features = batch.ids.len(), "Shapefile loaded");
                self.status.set(WorkspaceStatus::ShapefileLoaded);
            }
            Err(e) => {
                warn!(error = %e, "Shapefile import failed");
                self.status.set(WorkspaceStatus::UploadFailed);
            }
        }
        result
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Look up `query` and mark the first result.
    ///
    /// Blank queries are ignored (`None`): no request, no status change.
    pub async fn search(&self, query: &str) -> Option<Result<SearchResult, GeocodeError>> {
        if !SearchAdapter::<G>::accepts(query) {
            debug!("Ignoring blank search");
            return None;
        }
        self.status.set(WorkspaceStatus::Searching);

        let result = self.search.lookup(query).await;
        match &result {
            Ok(found) => {
                self.search.apply(found, &mut *self.surface.lock());
                self.status.set(WorkspaceStatus::Located(found.label.clone()));
            }
            Err(GeocodeError::NoResults) => {
                info!(query, "Search returned no results");
                self.status.set(WorkspaceStatus::NoResults);
            }
            Err(e) => {
                warn!(query, error = %e, "Search failed");
                self.status.set(WorkspaceStatus::SearchFailed);
            }
        }
        Some(result)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Deliver the AOI document as `aoi.geojson`.
    pub async fn export_geometry(&self) -> Result<PathBuf, ExportError> {
        let document = self.document();

        let result = self.export.export_geometry(&document).await;
        match &result {
            Ok(path) => {
                info!(path = %path.display(), features = document.len(), "GeoJSON exported");
                self.status.set(WorkspaceStatus::GeoJsonExported);
            }
            Err(e) => {
                warn!(error = %e, "GeoJSON export failed");
                self.status.set(WorkspaceStatus::ExportFailed);
            }
        }
        result
    }

    /// Capture the current view as a PNG.
    ///
    /// Imports are rejected while the capture is in flight.
    pub async fn export_snapshot(&self) -> Result<PathBuf, CaptureError> {
        let _guard = self.gate.begin_capture();
        self.status.set(WorkspaceStatus::CapturingScreenshot);

        let request = self.snapshot_request();
        let result = self.export.export_snapshot(request).await;
        match &result {
            Ok(path) => {
                info!(path = %path.display(), "Screenshot saved");
                self.status.set(WorkspaceStatus::ScreenshotSaved);
            }
            Err(e) => {
                warn!(error = %e, "Screenshot failed");
                self.status.set(WorkspaceStatus::ScreenshotFailed);
            }
        }
        result
    }

    /// Describe the visible map for the renderer.
    pub fn snapshot_request(&self) -> SnapshotRequest {
        let (basemap_template, basemap_max_zoom, overlay_opacity) = {
            let registry = self.registry.lock();
            let source = &registry.active_layer().source;
            (
                source.xyz_template(),
                source.max_zoom(),
                registry.overlay_opacity(),
            )
        };

        SnapshotRequest {
            viewport: self.surface.lock().viewport(),
            basemap_template,
            basemap_max_zoom,
            overlay_opacity,
            features: self.document().features,
            marker: self.search.placed(),
            options: CaptureOptions::default(),
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Ordered copy of every AOI.
    pub fn document(&self) -> FeatureCollection {
        self.store.lock().to_document()
    }

    pub fn feature_count(&self) -> usize {
        self.store.lock().len()
    }

    pub fn status(&self) -> WorkspaceStatus {
        self.status.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<WorkspaceStatus> {
        self.status.subscribe()
    }

    pub fn active_basemap(&self) -> BasemapId {
        self.registry.lock().active()
    }

    pub fn basemap_weight(&self, id: BasemapId) -> Option<f64> {
        self.registry.lock().weight(id)
    }

    pub fn overlay_opacity(&self) -> f64 {
        self.registry.lock().overlay_opacity()
    }

    pub fn marker(&self) -> Option<MarkerHandle> {
        self.search.marker()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Run `f` against the surface under its lock.
    pub fn with_surface<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        f(&mut *self.surface.lock())
    }

    /// Run `f` against the basemap registry under its lock.
    pub fn with_registry<T>(&self, f: impl FnOnce(&BasemapRegistry) -> T) -> T {
        f(&*self.registry.lock())
    }
}

/// Event name without its payload, for logging.
struct EventKind<'a>(&'a WorkspaceEvent);

impl std::fmt::Debug for EventKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            WorkspaceEvent::DrawCompleted(_) => "DrawCompleted",
            WorkspaceEvent::FileSelected(_) => "FileSelected",
            WorkspaceEvent::ArchiveLoaded(_) => "ArchiveLoaded",
            WorkspaceEvent::BasemapChosen(_) => "BasemapChosen",
            WorkspaceEvent::OpacityChanged(_) => "OpacityChanged",
            WorkspaceEvent::SearchSubmitted(_) => "SearchSubmitted",
            WorkspaceEvent::ExportGeometryRequested => "ExportGeometryRequested",
            WorkspaceEvent::SnapshotRequested => "SnapshotRequested",
        };
        f.write_str(name)
    }
}
