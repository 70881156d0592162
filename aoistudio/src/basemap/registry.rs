//! Basemap registry.
//!
//! Holds the mutually exclusive background layers and the independent
//! overlay as an indirection table from [`BasemapId`] to surface handles.
//! Exactly one basemap carries weight 1 at any time after initialization.

use tracing::{debug, info};

use super::prefetch::prefetch_grid;
use super::source::{BasemapId, TileSource, WmsSource};
use crate::config::WorkspaceConfig;
use crate::surface::{LayerHandle, LayerSource, MapSurface};

/// A registered background layer.
#[derive(Debug, Clone, PartialEq)]
pub struct BasemapLayer {
    pub id: BasemapId,
    pub source: TileSource,
    pub handle: LayerHandle,
    /// 1.0 when visible, 0.0 otherwise.
    pub weight: f64,
}

/// The orthophoto overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub source: WmsSource,
    pub handle: LayerHandle,
    /// Opacity in [0, 1].
    pub weight: f64,
}

/// Outcome of a basemap selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The id is not registered. Nothing changed.
    Unregistered,
    /// The id is already visible. Nothing changed.
    AlreadyActive,
    /// Visibility moved from `from` to `to`.
    Switched { from: BasemapId, to: BasemapId },
}

/// Registry of basemap layers.
#[derive(Debug)]
pub struct BasemapRegistry {
    layers: Vec<BasemapLayer>,
    active: BasemapId,
    overlay: OverlayLayer,
}

impl BasemapRegistry {
    /// Creates every configured layer on the surface.
    ///
    /// The default basemap is attached with weight 1; all other basemaps
    /// and the overlay start detached with weight 0.
    pub fn initialize<S: MapSurface>(surface: &mut S, config: &WorkspaceConfig) -> Self {
        let active = config.default_basemap();

        let layers: Vec<BasemapLayer> = config
            .basemaps()
            .into_iter()
            .map(|id| {
                let source = id.tile_source();
                let weight = if id == active { 1.0 } else { 0.0 };
                let handle = surface.create_layer(&LayerSource::Tiles(source.clone()), weight);
                if id == active {
                    surface.attach(handle);
                }
                BasemapLayer {
                    id,
                    source,
                    handle,
                    weight,
                }
            })
            .collect();

        let overlay_source = config.overlay().clone();
        let overlay_handle = surface.create_layer(&LayerSource::Wms(overlay_source.clone()), 0.0);

        info!(
            basemaps = layers.len(),
            active = %active,
            "Basemap registry initialized"
        );

        Self {
            layers,
            active,
            overlay: OverlayLayer {
                source: overlay_source,
                handle: overlay_handle,
                weight: 0.0,
            },
        }
    }

    /// Requests a small grid of low-zoom tiles for every basemap to warm
    /// caches.
    ///
    /// Fire-and-forget: the surface never reports failures. Returns the
    /// number of tiles requested.
    pub fn prefetch<S: MapSurface>(&self, surface: &mut S, zoom: u8, grid: u32) -> usize {
        let tiles = prefetch_grid(zoom, grid);
        for layer in &self.layers {
            for tile in &tiles {
                surface.prefetch_tile(layer.handle, *tile);
            }
        }

        let requested = tiles.len() * self.layers.len();
        debug!(zoom, grid, requested, "Basemap prefetch requested");
        requested
    }

    /// Makes `id` the visible basemap.
    pub fn select<S: MapSurface>(&mut self, id: BasemapId, surface: &mut S) -> Selection {
        let Some(target) = self.layers.iter().position(|l| l.id == id) else {
            debug!(basemap = %id, "Ignoring selection of unregistered basemap");
            return Selection::Unregistered;
        };

        if id == self.active {
            return Selection::AlreadyActive;
        }

        let target_handle = self.layers[target].handle;
        if !surface.is_attached(target_handle) {
            surface.attach(target_handle);
        }

        let from = self.active;
        for layer in &mut self.layers {
            if layer.id == from {
                layer.weight = 0.0;
                surface.set_opacity(layer.handle, 0.0);
            }
        }

        self.layers[target].weight = 1.0;
        surface.set_opacity(target_handle, 1.0);
        self.active = id;

        info!(from = %from, to = %id, "Basemap switched");
        Selection::Switched { from, to: id }
    }

    /// Sets the overlay opacity, clamped to [0, 1] (NaN counts as 0).
    ///
    /// The overlay is attached to the surface the first time a non-zero
    /// opacity is applied. Returns the applied value.
    pub fn set_overlay_opacity<S: MapSurface>(&mut self, value: f64, surface: &mut S) -> f64 {
        let opacity = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };

        if opacity > 0.0 && !surface.is_attached(self.overlay.handle) {
            surface.attach(self.overlay.handle);
            debug!("Overlay attached");
        }

        surface.set_opacity(self.overlay.handle, opacity);
        self.overlay.weight = opacity;
        opacity
    }

    pub fn active(&self) -> BasemapId {
        self.active
    }

    /// Layer of the visible basemap.
    pub fn active_layer(&self) -> &BasemapLayer {
        // `active` is only ever set to a registered id
        self.layers
            .iter()
            .find(|l| l.id == self.active)
            .unwrap_or(&self.layers[0])
    }

    pub fn is_registered(&self, id: BasemapId) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    pub fn weight(&self, id: BasemapId) -> Option<f64> {
        self.layers.iter().find(|l| l.id == id).map(|l| l.weight)
    }

    pub fn layers(&self) -> &[BasemapLayer] {
        &self.layers
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    pub fn overlay_opacity(&self) -> f64 {
        self.overlay.weight
    }
}
