//! Workspace configuration.

use std::time::Duration;

use super::defaults::*;
use crate::basemap::{BasemapId, WmsSource};
use crate::coord::{LatLon, MAX_ZOOM};
use crate::surface::Viewport;

/// Settings fixed for the lifetime of a workspace.
///
/// # Example
///
/// ```
/// use aoistudio::basemap::BasemapId;
/// use aoistudio::config::WorkspaceConfig;
///
/// let config = WorkspaceConfig::new()
///     .with_default_basemap(BasemapId::Dark)
///     .with_zoom(11);
///
/// assert_eq!(config.default_basemap(), BasemapId::Dark);
/// assert!(config.basemaps().contains(&BasemapId::Dark));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    center: LatLon,
    zoom: u8,
    viewport_size: (u32, u32),
    default_basemap: BasemapId,
    basemaps: Vec<BasemapId>,
    overlay: WmsSource,
    prefetch_zoom: u8,
    prefetch_grid: u32,
    search_zoom: u8,
    fly_duration: Duration,
}

impl WorkspaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial map centre.
    pub fn with_center(mut self, center: LatLon) -> Self {
        self.center = center;
        self
    }

    /// Set the initial zoom level. Values above the maximum are clamped.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom.min(MAX_ZOOM);
        self
    }

    /// Set the viewport size in pixels.
    pub fn with_viewport_size(mut self, width_px: u32, height_px: u32) -> Self {
        self.viewport_size = (width_px.max(1), height_px.max(1));
        self
    }

    /// Set the basemap visible after initialization.
    ///
    /// It is registered even if missing from the basemap list.
    pub fn with_default_basemap(mut self, basemap: BasemapId) -> Self {
        self.default_basemap = basemap;
        self
    }

    /// Restrict the registered basemaps. Duplicates are ignored.
    pub fn with_basemaps(mut self, basemaps: &[BasemapId]) -> Self {
        self.basemaps = Vec::with_capacity(basemaps.len());
        for id in basemaps {
            if !self.basemaps.contains(id) {
                self.basemaps.push(*id);
            }
        }
        self
    }

    pub fn with_overlay(mut self, overlay: WmsSource) -> Self {
        self.overlay = overlay;
        self
    }

    /// Set the prefetch zoom level and grid size. A grid of 0 disables
    /// prefetching.
    pub fn with_prefetch(mut self, zoom: u8, grid: u32) -> Self {
        self.prefetch_zoom = zoom.min(MAX_ZOOM);
        self.prefetch_grid = grid;
        self
    }

    /// Set the zoom level and transition duration used after a search.
    pub fn with_search_view(mut self, zoom: u8, fly_duration: Duration) -> Self {
        self.search_zoom = zoom.min(MAX_ZOOM);
        self.fly_duration = fly_duration;
        self
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Initial viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            center: self.center,
            zoom: self.zoom,
            width_px: self.viewport_size.0,
            height_px: self.viewport_size.1,
        }
    }

    pub fn default_basemap(&self) -> BasemapId {
        self.default_basemap
    }

    /// Registered basemaps in menu order, always including the default.
    pub fn basemaps(&self) -> Vec<BasemapId> {
        let mut basemaps = self.basemaps.clone();
        if !basemaps.contains(&self.default_basemap) {
            basemaps.insert(0, self.default_basemap);
        }
        basemaps
    }

    pub fn overlay(&self) -> &WmsSource {
        &self.overlay
    }

    pub fn prefetch_zoom(&self) -> u8 {
        self.prefetch_zoom
    }

    pub fn prefetch_grid(&self) -> u32 {
        self.prefetch_grid
    }

    pub fn search_zoom(&self) -> u8 {
        self.search_zoom
    }

    pub fn fly_duration(&self) -> Duration {
        self.fly_duration
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            viewport_size: (DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            default_basemap: DEFAULT_BASEMAP,
            basemaps: BasemapId::ALL.to_vec(),
            overlay: WmsSource::nrw_dop(),
            prefetch_zoom: DEFAULT_PREFETCH_ZOOM,
            prefetch_grid: DEFAULT_PREFETCH_GRID,
            search_zoom: DEFAULT_SEARCH_ZOOM,
            fly_duration: DEFAULT_FLY_DURATION,
        }
    }
}
