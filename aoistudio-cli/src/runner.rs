//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and workspace
//! construction so command handlers stay small.

use std::path::{Path, PathBuf};

use aoistudio::basemap::{TileWarmer, WarmReport};
use aoistudio::codec::ZipShapefileConverter;
use aoistudio::export::{DirectorySink, StaticMapRenderer};
use aoistudio::geocode::NominatimGeocoder;
use aoistudio::http::AsyncReqwestClient;
use aoistudio::logging::{init_logging, LoggingGuard, DEFAULT_LOG_FILE};
use aoistudio::surface::HeadlessSurface;
use aoistudio::workspace::Workspace;
use tracing::info;

use crate::config_file::{config_file_path, ConfigFile};
use crate::error::CliError;

/// The workspace as the CLI assembles it.
pub type CliWorkspace = Workspace<
    HeadlessSurface,
    NominatimGeocoder<AsyncReqwestClient>,
    ZipShapefileConverter,
    StaticMapRenderer,
    DirectorySink,
>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load the config file and initialize logging.
    ///
    /// Command output goes to stdout, so logs only reach stdout with
    /// `--verbose`.
    pub fn new(config_path: Option<&Path>, debug: bool, verbose: bool) -> Result<Self, CliError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&path)?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let logging_guard = init_logging(&log_dir, &log_file, verbose, debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("AOI Studio v{}", aoistudio::VERSION);
        info!("AOI Studio CLI: {} command", command);
    }

    /// Assemble a workspace writing artifacts to `output_dir`, or the
    /// configured export directory.
    pub fn workspace(&self, output_dir: Option<PathBuf>) -> Result<CliWorkspace, CliError> {
        let workspace_config = self.config.workspace_config();
        let surface = HeadlessSurface::new(workspace_config.viewport());
        let geocoder = NominatimGeocoder::with_endpoint(
            AsyncReqwestClient::new()?,
            self.config.geocoder.endpoint.clone(),
        );
        let sink = DirectorySink::new(
            output_dir.unwrap_or_else(|| self.config.export.output_dir.clone()),
        );

        Ok(Workspace::new(
            workspace_config,
            surface,
            geocoder,
            ZipShapefileConverter::new(),
            StaticMapRenderer::new(),
            sink,
        ))
    }

    /// Fetch the tiles the workspace queued during initialization.
    pub async fn warm_tiles(&self, workspace: &CliWorkspace) -> Result<WarmReport, CliError> {
        let urls = workspace.with_surface(|surface| surface.take_prefetch_urls());
        let warmer = TileWarmer::new(AsyncReqwestClient::new()?);
        Ok(warmer.warm(urls).await)
    }
}
