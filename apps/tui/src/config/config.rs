use dotenv::dotenv;
use ip_tracker_core::map::{LatLng, MapOptions};
use ip_tracker_core::{MarkerPolicy, TrackerConfig};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is not valid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot resolve working directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

/// Runtime settings for the terminal app, read from the environment.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub tracker: TrackerConfig,
    pub database_path: PathBuf,
    pub log_file: PathBuf,
    pub lookup_timeout: Option<Duration>,
    /// Logical pixels covered by one terminal cell, used to size the map viewport.
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

/// Loads `.env` and builds [`AppSettings`] from the process environment.
pub fn init_app_config() -> Result<AppSettings, ConfigError> {
    // Load environment variables from .env file
    dotenv().ok();

    let base_dir = env::current_dir()?;
    AppSettings::from_source(&base_dir, |name| env::var(name).ok())
}

impl AppSettings {
    /// Builds settings from any variable source; `base_dir` anchors relative paths.
    pub fn from_source<F>(base_dir: &Path, source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TrackerConfig::default();
        let map_defaults = MapOptions::default();

        let map = MapOptions {
            center: LatLng::new(
                parse_or(&source, "MAP_CENTER_LAT", map_defaults.center.lat)?,
                parse_or(&source, "MAP_CENTER_LNG", map_defaults.center.lng)?,
            ),
            zoom: parse_or(&source, "MAP_ZOOM", map_defaults.zoom)?,
            tile_url: source("TILE_URL").unwrap_or(map_defaults.tile_url),
            max_zoom: parse_or(&source, "TILE_MAX_ZOOM", map_defaults.max_zoom)?,
            ..map_defaults
        };

        let tracker = TrackerConfig {
            endpoint: source("GEO_API_URL").unwrap_or(defaults.endpoint),
            api_key: source("GEO_API_KEY").unwrap_or_default(),
            default_ip: source("DEFAULT_IP").unwrap_or(defaults.default_ip),
            map,
            mobile_breakpoint: parse_or(&source, "MOBILE_BREAKPOINT", defaults.mobile_breakpoint)?,
            marker_policy: parse_or(&source, "MARKER_POLICY", defaults.marker_policy)?,
            ..defaults
        };

        let lookup_timeout = source("LOOKUP_TIMEOUT_SECS")
            .map(|value| parse_value::<u64>("LOOKUP_TIMEOUT_SECS", &value))
            .transpose()?
            .map(Duration::from_secs);

        let db_name = source("DATABASE_NAME").unwrap_or_else(|| "ip_tracker.db".to_string());
        let log_name = source("LOG_FILE").unwrap_or_else(|| "ip_tracker.log".to_string());

        Ok(Self {
            tracker,
            database_path: base_dir.join(db_name),
            log_file: base_dir.join(log_name),
            lookup_timeout,
            cell_width_px: parse_or(&source, "CELL_WIDTH_PX", 8.0)?,
            cell_height_px: parse_or(&source, "CELL_HEIGHT_PX", 16.0)?,
        })
    }
}

fn parse_or<F, T>(source: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    source(name).map_or(Ok(default), |value| parse_value(name, &value))
}

fn parse_value<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// SQLx connection string for a database file.
///
/// Absolute paths need three slashes (`sqlite:///abs/path.db`), relative ones two.
pub fn database_url(path: &Path) -> String {
    let path_str = path.to_string_lossy();
    let clean_path = path_str.trim_start_matches('/');

    if path.is_absolute() {
        format!("sqlite:///{clean_path}")
    } else {
        format!("sqlite://{clean_path}")
    }
}
