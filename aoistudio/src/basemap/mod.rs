//! Basemap catalogue, layer registry and tile prefetch.

mod prefetch;
mod registry;
mod source;

pub use prefetch::{prefetch_grid, TileWarmer, WarmReport};
pub use registry::{BasemapLayer, BasemapRegistry, OverlayLayer, Selection};
pub use source::{BasemapId, TileSource, UnknownBasemap, WmsSource, DEFAULT_OVERLAY_ENDPOINT};
