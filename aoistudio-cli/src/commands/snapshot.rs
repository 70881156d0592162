//! `aoistudio snapshot`: compose a map and capture it as PNG.

use std::path::PathBuf;

use aoistudio::basemap::Selection;
use clap::Args;
use tracing::info;

use crate::error::CliError;
use crate::runner::{CliRunner, CliWorkspace};

/// Arguments for `snapshot`.
#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Zip archive to import before capturing
    #[arg(long)]
    pub import: Option<PathBuf>,

    /// Basemap key (osm, light, dark, topo)
    #[arg(long)]
    pub basemap: Option<String>,

    /// Place to search and mark before capturing
    #[arg(long)]
    pub search: Option<String>,

    /// Orthophoto overlay opacity, 0.0 to 1.0
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Fetch the low-zoom prefetch tiles before capturing
    #[arg(long)]
    pub warm_cache: bool,

    /// Output directory (defaults to [export] output_dir)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub async fn run(runner: &CliRunner, args: SnapshotArgs) -> Result<(), CliError> {
    runner.log_startup("snapshot");
    let workspace = runner.workspace(args.output.clone())?;

    if args.warm_cache {
        let report = runner.warm_tiles(&workspace).await?;
        println!(
            "Warmed {}/{} tiles",
            report.succeeded, report.requested
        );
    }

    compose(&workspace, &args).await?;

    let path = workspace
        .export_snapshot()
        .await
        .map_err(CliError::Capture)?;
    println!("{}: {}", workspace.status(), path.display());
    Ok(())
}

/// Apply the requested basemap, overlay, import and search in that order.
async fn compose(workspace: &CliWorkspace, args: &SnapshotArgs) -> Result<(), CliError> {
    if let Some(key) = &args.basemap {
        if workspace.select_basemap(key) == Selection::Unregistered {
            return Err(CliError::InvalidArgument(format!(
                "Unknown basemap '{}'. Run 'aoistudio basemaps' to list them.",
                key
            )));
        }
        println!("{}", workspace.status());
    }

    if let Some(opacity) = args.opacity {
        let applied = workspace.set_overlay_opacity(opacity);
        info!(requested = opacity, applied, "Overlay opacity set");
    }

    if let Some(archive) = &args.import {
        workspace
            .import_file(archive)
            .await
            .ok_or(CliError::Busy)?
            .map_err(CliError::Import)?;
        println!("{}", workspace.status());
    }

    if let Some(query) = &args.search {
        if let Some(result) = workspace.search(query).await {
            result.map_err(CliError::Search)?;
            println!("{}", workspace.status());
        }
    }

    Ok(())
}
