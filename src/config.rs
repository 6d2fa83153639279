//! Runtime configuration for a weather lookup
//!
//! A [`Config`] is assembled from parsed CLI arguments plus the resolved API
//! key, and hands the fetch and cache layers the parameters they need.

use std::fmt;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::cli::Cli;
use crate::data::FetchOptions;

/// Query that asks the API to geolocate the caller by IP address
pub const AUTO_LOCATION: &str = "auto:ip";

/// Forecast days requested when none are given
pub const DEFAULT_DAYS: u8 = 3;

/// Largest forecast range the API serves
pub const MAX_DAYS: u8 = 14;

/// Settings for one invocation
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    /// Overrides the forecast endpoint (used by tests and proxies)
    pub api_url: Option<String>,
    /// Location query sent to the API
    pub location: String,
    /// True when the location was auto-detected rather than given explicitly
    pub is_local: bool,
    pub days: u8,
    pub include_aqi: bool,
    pub alerts: bool,
    pub cache_ttl: Duration,
    pub use_cache: bool,
    pub color: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("location", &self.location)
            .field("is_local", &self.is_local)
            .field("days", &self.days)
            .field("include_aqi", &self.include_aqi)
            .field("alerts", &self.alerts)
            .field("cache_ttl", &self.cache_ttl)
            .field("use_cache", &self.use_cache)
            .field("color", &self.color)
            .finish()
    }
}

impl Config {
    /// Creates a configuration for the caller's own location with defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: None,
            location: AUTO_LOCATION.to_string(),
            is_local: true,
            days: DEFAULT_DAYS,
            include_aqi: true,
            alerts: true,
            cache_ttl: DEFAULT_TTL,
            use_cache: true,
            color: true,
        }
    }

    /// Builds the configuration from CLI arguments
    pub fn from_cli(cli: &Cli, api_key: impl Into<String>) -> Self {
        let mut config = Self::new(api_key);

        if let Some(location) = &cli.location {
            config.set_location(location);
        }
        config.api_url = cli.api_url.clone();
        config.days = cli.days.clamp(1, MAX_DAYS);
        config.include_aqi = !cli.no_aqi;
        config.alerts = !cli.no_alerts;
        config.cache_ttl = cli.cache_ttl();
        config.use_cache = !cli.no_cache;
        config.color = !cli.no_color;

        config
    }

    /// Switches to an explicit location; blank input keeps auto-detection
    pub fn set_location(&mut self, location: &str) {
        let location = location.trim();
        if location.is_empty() {
            return;
        }
        self.location = location.to_string();
        self.is_local = false;
    }

    /// Parameters for the forecast request
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            location: self.location.clone(),
            days: self.days,
            include_aqi: self.include_aqi,
            alerts: self.alerts,
        }
    }
}
