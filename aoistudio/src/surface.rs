//! Rendering surface collaborator.
//!
//! The workspace never holds rendering objects. It keeps opaque handles
//! issued by a [`MapSurface`] and drives the surface through them, so the
//! state engine runs the same against a real map widget or against the
//! in-memory [`HeadlessSurface`].

use std::time::Duration;

use tracing::{debug, trace};

use crate::aoi::Feature;
use crate::basemap::{TileSource, WmsSource};
use crate::coord::{fit_zoom, Bounds, LatLon, TileCoord};

/// Opaque handle of a layer created on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u32);

/// Opaque handle of a marker placed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u32);

/// What a layer draws.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    Tiles(TileSource),
    Wms(WmsSource),
}

/// Visible part of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLon,
    pub zoom: u8,
    pub width_px: u32,
    pub height_px: u32,
}

/// Interface of the tile-rendering engine.
///
/// Calls are synchronous; animation and tile loading happen inside the
/// implementation.
pub trait MapSurface: Send {
    /// Creates a detached layer with the given initial opacity.
    fn create_layer(&mut self, source: &LayerSource, opacity: f64) -> LayerHandle;

    /// Attaches a layer. Attaching an attached layer is a no-op.
    fn attach(&mut self, layer: LayerHandle);

    fn is_attached(&self, layer: LayerHandle) -> bool;

    fn set_opacity(&mut self, layer: LayerHandle, opacity: f64);

    /// Requests a tile purely to warm caches. Failures are never reported.
    fn prefetch_tile(&mut self, layer: LayerHandle, tile: TileCoord);

    /// Draws features. The surface copies what it keeps.
    fn show_features(&mut self, features: &[Feature]);

    /// Moves the view so `bounds` fits inside it.
    fn fit_bounds(&mut self, bounds: Bounds);

    /// Smooth viewport transition to `target`.
    fn fly_to(&mut self, target: LatLon, zoom: u8, duration: Duration);

    /// Places a marker with a visible label.
    fn place_marker(&mut self, at: LatLon, label: &str) -> MarkerHandle;

    fn remove_marker(&mut self, marker: MarkerHandle);

    fn viewport(&self) -> Viewport;
}

/// Layer state tracked by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessLayer {
    pub source: LayerSource,
    pub opacity: f64,
    pub attached: bool,
}

/// Marker tracked by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub handle: MarkerHandle,
    pub position: LatLon,
    pub label: String,
}

/// In-memory surface with no rendering.
///
/// View changes apply instantly. Prefetch requests are queued as URLs for
/// the caller to warm (see [`crate::basemap::TileWarmer`]).
#[derive(Debug)]
pub struct HeadlessSurface {
    layers: Vec<HeadlessLayer>,
    markers: Vec<HeadlessMarker>,
    next_marker: u32,
    features: Vec<Feature>,
    viewport: Viewport,
    pending_prefetch: Vec<String>,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            layers: Vec::new(),
            markers: Vec::new(),
            next_marker: 0,
            features: Vec::new(),
            viewport,
            pending_prefetch: Vec::new(),
        }
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&HeadlessLayer> {
        self.layers.get(handle.0 as usize)
    }

    pub fn layers(&self) -> &[HeadlessLayer] {
        &self.layers
    }

    pub fn markers(&self) -> &[HeadlessMarker] {
        &self.markers
    }

    /// Features drawn on the surface so far.
    pub fn rendered_features(&self) -> &[Feature] {
        &self.features
    }

    /// Drains the queued prefetch URLs.
    pub fn take_prefetch_urls(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_prefetch)
    }

    pub fn pending_prefetch(&self) -> &[String] {
        &self.pending_prefetch
    }

    fn layer_mut(&mut self, handle: LayerHandle) -> Option<&mut HeadlessLayer> {
        self.layers.get_mut(handle.0 as usize)
    }
}

impl MapSurface for HeadlessSurface {
    fn create_layer(&mut self, source: &LayerSource, opacity: f64) -> LayerHandle {
        let handle = LayerHandle(self.layers.len() as u32);
        self.layers.push(HeadlessLayer {
            source: source.clone(),
            opacity,
            attached: false,
        });
        handle
    }

    fn attach(&mut self, layer: LayerHandle) {
        if let Some(layer) = self.layer_mut(layer) {
            layer.attached = true;
        }
    }

    fn is_attached(&self, layer: LayerHandle) -> bool {
        self.layer(layer).is_some_and(|l| l.attached)
    }

    fn set_opacity(&mut self, layer: LayerHandle, opacity: f64) {
        if let Some(layer) = self.layer_mut(layer) {
            layer.opacity = opacity;
        }
    }

    fn prefetch_tile(&mut self, layer: LayerHandle, tile: TileCoord) {
        let url = match self.layer(layer).map(|l| &l.source) {
            Some(LayerSource::Tiles(source)) => source.tile_url(&tile),
            Some(LayerSource::Wms(source)) => source.get_map_url(&tile),
            None => return,
        };
        trace!(url = %url, "Queued tile prefetch");
        self.pending_prefetch.push(url);
    }

    fn show_features(&mut self, features: &[Feature]) {
        self.features.extend_from_slice(features);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport.center = bounds.center();
        self.viewport.zoom = fit_zoom(&bounds, self.viewport.width_px, self.viewport.height_px);
        debug!(
            center = %self.viewport.center,
            zoom = self.viewport.zoom,
            "Viewport fitted to bounds"
        );
    }

    fn fly_to(&mut self, target: LatLon, zoom: u8, duration: Duration) {
        debug!(
            destination = %target,
            zoom,
            duration_ms = duration.as_millis() as u64,
            "Viewport flown to target"
        );
        self.viewport.center = target;
        self.viewport.zoom = zoom;
    }

    fn place_marker(&mut self, at: LatLon, label: &str) -> MarkerHandle {
        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.markers.push(HeadlessMarker {
            handle,
            position: at,
            label: label.to_string(),
        });
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.retain(|m| m.handle != marker);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
