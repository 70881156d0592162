//! Areas of interest.
//!
//! [`feature`] holds the canonical GeoJSON-like representation every AOI is
//! normalized into, whether it was drawn or imported. [`AoiStore`] is the
//! single source of truth for what gets exported.

pub mod feature;
mod store;

pub use feature::{
    DrawnShape, Feature, FeatureCollection, Geometry, Position, Properties, CIRCLE_SEGMENTS,
    EARTH_RADIUS_M, POPUP_PROPERTY,
};
pub use store::{AoiStore, FeatureId, ImportBatch};
