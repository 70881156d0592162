//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`basemaps`] - List available basemaps
//! - [`config`] - Configuration management (path, init, show)
//! - [`convert`] - Shapefile archive to GeoJSON
//! - [`search`] - Place lookup
//! - [`snapshot`] - PNG capture of a composed map

pub mod basemaps;
pub mod config;
pub mod convert;
pub mod search;
pub mod snapshot;
