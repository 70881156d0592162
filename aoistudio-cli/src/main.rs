//! AOI Studio CLI - Command-line interface
//!
//! Drives a headless AOI workspace: list basemaps, search places, convert
//! shapefile archives to GeoJSON and capture map snapshots.

mod commands;
mod config_file;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::convert::ConvertArgs;
use commands::search::SearchArgs;
use commands::snapshot::SnapshotArgs;
use config_file::config_file_path;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "aoistudio")]
#[command(version = aoistudio::VERSION)]
#[command(about = "Draw, import and export areas of interest over tiled basemaps", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.aoistudio/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Mirror log output to stdout
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available basemaps
    Basemaps,

    /// Look up a place and print its location
    Search(SearchArgs),

    /// Convert a zipped shapefile to aoi.geojson
    Convert(ConvertArgs),

    /// Capture the composed map as a PNG
    Snapshot(SnapshotArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().unwrap_or_else(config_file_path);

    match cli.command {
        Commands::Basemaps => commands::basemaps::run(&config_path),
        Commands::Config(command) => commands::config::run(command, &config_path),
        Commands::Search(args) => {
            let runner = CliRunner::new(Some(&config_path), cli.debug, cli.verbose)?;
            commands::search::run(&runner, args).await
        }
        Commands::Convert(args) => {
            let runner = CliRunner::new(Some(&config_path), cli.debug, cli.verbose)?;
            commands::convert::run(&runner, args).await
        }
        Commands::Snapshot(args) => {
            let runner = CliRunner::new(Some(&config_path), cli.debug, cli.verbose)?;
            commands::snapshot::run(&runner, args).await
        }
    }
}
