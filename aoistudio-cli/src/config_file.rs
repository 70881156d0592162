//! Configuration file handling for ~/.aoistudio/config.ini.
//!
//! Every key is optional; missing keys fall back to the library defaults.

use std::path::{Path, PathBuf};

use aoistudio::basemap::BasemapId;
use aoistudio::config::{
    WorkspaceConfig, DEFAULT_BASEMAP, DEFAULT_CENTER, DEFAULT_GEOCODER_ENDPOINT,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, DEFAULT_ZOOM,
};
use aoistudio::coord::{LatLon, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON};
use aoistudio::logging::DEFAULT_LOG_FILE;
use ini::Ini;
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// `[map]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub basemap: BasemapId,
    pub center: LatLon,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
}

/// `[geocoder]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderSettings {
    pub endpoint: String,
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub map: MapSettings,
    pub geocoder: GeocoderSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            map: MapSettings {
                basemap: DEFAULT_BASEMAP,
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
                width: DEFAULT_VIEWPORT_WIDTH,
                height: DEFAULT_VIEWPORT_HEIGHT,
            },
            geocoder: GeocoderSettings {
                endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            },
            export: ExportSettings {
                output_dir: PathBuf::from("."),
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from a path, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(ConfigFileError::WriteError)
    }

    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("map"))
            .set("basemap", self.map.basemap.key())
            .set("center_lat", self.map.center.lat.to_string())
            .set("center_lon", self.map.center.lon.to_string())
            .set("zoom", self.map.zoom.to_string())
            .set("width", self.map.width.to_string())
            .set("height", self.map.height.to_string());
        ini.with_section(Some("geocoder"))
            .set("endpoint", self.geocoder.endpoint.as_str());
        ini.with_section(Some("export"))
            .set("output_dir", self.export.output_dir.to_string_lossy());
        ini.with_section(Some("logging"))
            .set("file", self.logging.file.to_string_lossy());
        ini
    }

    /// Workspace settings derived from the `[map]` section.
    pub fn workspace_config(&self) -> WorkspaceConfig {
        WorkspaceConfig::new()
            .with_center(self.map.center)
            .with_zoom(self.map.zoom)
            .with_viewport_size(self.map.width, self.map.height)
            .with_default_basemap(self.map.basemap)
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(
    section: &str,
    key: &str,
    value: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "not a number"))
}

/// Parse an `Ini` object, overlaying its values on the defaults.
pub fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("basemap") {
            config.map.basemap = v.parse().map_err(|_| {
                invalid("map", "basemap", v, "must be one of: osm, light, dark, topo")
            })?;
        }
        if let Some(v) = section.get("center_lat") {
            let lat: f64 = parse_number("map", "center_lat", v)?;
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(invalid("map", "center_lat", v, "outside Web Mercator range"));
            }
            config.map.center.lat = lat;
        }
        if let Some(v) = section.get("center_lon") {
            let lon: f64 = parse_number("map", "center_lon", v)?;
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(invalid("map", "center_lon", v, "must be within -180..180"));
            }
            config.map.center.lon = lon;
        }
        if let Some(v) = section.get("zoom") {
            let zoom: u8 = parse_number("map", "zoom", v)?;
            if zoom > MAX_ZOOM {
                return Err(invalid("map", "zoom", v, "must be 0-18"));
            }
            config.map.zoom = zoom;
        }
        if let Some(v) = section.get("width") {
            config.map.width = parse_number("map", "width", v)?;
            if config.map.width == 0 {
                return Err(invalid("map", "width", v, "must be positive"));
            }
        }
        if let Some(v) = section.get("height") {
            config.map.height = parse_number("map", "height", v)?;
            if config.map.height == 0 {
                return Err(invalid("map", "height", v, "must be positive"));
            }
        }
    }

    // [geocoder] section
    if let Some(section) = ini.section(Some("geocoder")) {
        if let Some(v) = section.get("endpoint") {
            let v = v.trim();
            if !v.is_empty() {
                config.geocoder.endpoint = v.to_string();
            }
        }
    }

    // [export] section
    if let Some(section) = ini.section(Some("export")) {
        if let Some(v) = section.get("output_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.export.output_dir = expand_tilde(v);
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Expand a leading `~/` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Get the path to the config directory (~/.aoistudio).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aoistudio")
}

/// Get the path to the config file (~/.aoistudio/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        parse_ini(&Ini::load_from_str(text).unwrap())
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_map_section() {
        let config = parse(
            "[map]\nbasemap = Dark\ncenter_lat = 51.51\ncenter_lon = 7.47\nzoom = 12\nwidth = 640\nheight = 480\n",
        )
        .unwrap();

        assert_eq!(config.map.basemap, BasemapId::Dark);
        assert_eq!(config.map.center, LatLon::new(51.51, 7.47));
        assert_eq!(config.map.zoom, 12);

        let workspace = config.workspace_config();
        assert_eq!(workspace.default_basemap(), BasemapId::Dark);
        assert_eq!(workspace.viewport().width_px, 640);
    }

    #[test]
    fn test_unknown_basemap_rejected() {
        let err = parse("[map]\nbasemap = satellite\n").unwrap_err();
        assert!(err.to_string().contains("map.basemap = 'satellite'"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(parse("[map]\ncenter_lat = 89\n").is_err());
        assert!(parse("[map]\ncenter_lon = 200\n").is_err());
        assert!(parse("[map]\nzoom = 19\n").is_err());
        assert!(parse("[map]\nwidth = 0\n").is_err());
        assert!(parse("[map]\nzoom = high\n").is_err());
    }

    #[test]
    fn test_blank_endpoint_keeps_default() {
        let config = parse("[geocoder]\nendpoint =\n").unwrap();
        assert_eq!(config.geocoder.endpoint, DEFAULT_GEOCODER_ENDPOINT);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.map.basemap = BasemapId::Topo;
        config.export.output_dir = temp.path().join("out");
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_config_path_under_home() {
        assert!(config_file_path().ends_with(".aoistudio/config.ini"));
    }
}
