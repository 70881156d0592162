//! Configuration types for the workspace.
//!
//! The core reads no files or environment variables; callers build a
//! [`WorkspaceConfig`] (the CLI loads one from its own config file).

mod defaults;
mod workspace;

pub use defaults::*;
pub use workspace::WorkspaceConfig;
