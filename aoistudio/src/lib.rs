//! AOI Studio - interactive area-of-interest map workspace
//!
//! This library holds the state engine behind an AOI map: which basemap is
//! visible, how the feature collection grows from drawing and shapefile
//! import, and how it is exported as GeoJSON or a PNG snapshot. Rendering,
//! geocoding, conversion and downloads are collaborators behind traits.
//!
//! # Example
//!
//! ```ignore
//! use aoistudio::config::WorkspaceConfig;
//! use aoistudio::workspace::{Workspace, WorkspaceEvent};
//!
//! let ws = Workspace::new(config, surface, geocoder, converter, renderer, sink);
//! ws.dispatch(WorkspaceEvent::BasemapChosen("dark".into())).await;
//! assert_eq!(ws.status().to_string(), "Basemap: dark");
//! ```

pub mod aoi;
pub mod basemap;
pub mod codec;
pub mod config;
pub mod coord;
pub mod export;
pub mod geocode;
pub mod http;
pub mod logging;
pub mod surface;
pub mod workspace;

/// Version of the AOI Studio library and CLI.
///
/// Synchronized across the workspace through `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
