use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::map::MapOptions;
use crate::record::LookupError;
use crate::storage::DEFAULT_LAST_QUERY;

pub const DEFAULT_ENDPOINT: &str = "https://geo.ipify.org/api/v2/country,city";
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 992.0;
pub const DEFAULT_MOBILE_OFFSET_RATIO: f64 = 0.15;
pub const DEFAULT_NOTIFICATION_SECS: u64 = 3;

/// What happens to earlier markers when a new lookup lands on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerPolicy {
    /// Every lookup adds a pin and none are removed.
    #[default]
    Accumulate,
    /// Only the pin of the latest lookup is shown.
    Replace,
}

impl MarkerPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accumulate => "accumulate",
            Self::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown marker policy {0:?} (expected \"accumulate\" or \"replace\")")]
pub struct UnknownMarkerPolicy(pub String);

impl FromStr for MarkerPolicy {
    type Err = UnknownMarkerPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "accumulate" => Ok(Self::Accumulate),
            "replace" => Ok(Self::Replace),
            other => Err(UnknownMarkerPolicy(other.to_string())),
        }
    }
}

/// Everything a front end needs to build a [`crate::LookupController`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub default_ip: String,
    pub map: MapOptions,
    /// Viewport width (logical px) at or below which the mobile offset applies.
    pub mobile_breakpoint: f64,
    /// Fraction of the map height to pan up on narrow viewports.
    pub mobile_offset_ratio: f64,
    pub marker_policy: MarkerPolicy,
    pub notification_duration: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            default_ip: DEFAULT_LAST_QUERY.to_string(),
            map: MapOptions::default(),
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            mobile_offset_ratio: DEFAULT_MOBILE_OFFSET_RATIO,
            marker_policy: MarkerPolicy::default(),
            notification_duration: Duration::from_secs(DEFAULT_NOTIFICATION_SECS),
        }
    }
}

impl TrackerConfig {
    /// `<endpoint>?apiKey=<key>&ipAddress=<ip>`
    pub fn lookup_url(&self, ip: &str) -> Result<Url, LookupError> {
        Url::parse_with_params(
            &self.endpoint,
            [("apiKey", self.api_key.as_str()), ("ipAddress", ip)],
        )
        .map_err(|e| LookupError::Url(e.to_string()))
    }
}
