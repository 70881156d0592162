//! `aoistudio convert`: zipped shapefile to `aoi.geojson`.

use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `convert`.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Zip archive holding one or more shapefile layers
    pub archive: PathBuf,

    /// Output directory (defaults to [export] output_dir)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub async fn run(runner: &CliRunner, args: ConvertArgs) -> Result<(), CliError> {
    runner.log_startup("convert");
    let workspace = runner.workspace(args.output)?;

    let batch = workspace
        .import_file(&args.archive)
        .await
        .ok_or(CliError::Busy)?
        .map_err(CliError::Import)?;
    println!("{} ({} features)", workspace.status(), batch.ids.len());

    let path = workspace.export_geometry().await.map_err(CliError::Export)?;
    println!("{}: {}", workspace.status(), path.display());
    Ok(())
}
