//! Command-line interface parsing for weather-cli
//!
//! This module handles parsing of CLI arguments using clap and resolving them
//! into the single [`Command`] the binary should run.

use std::time::Duration;

use clap::{ArgGroup, Parser};
use thiserror::Error;

use crate::config::{DEFAULT_DAYS, MAX_DAYS};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The location argument was given but contains only whitespace
    #[error("Invalid location: '{0}'. Omit the location to use your current position")]
    BlankLocation(String),
}

/// weather-cli - current conditions and forecast in your terminal
#[derive(Parser, Debug)]
#[command(name = "weather-cli")]
#[command(about = "Weather conditions and forecast in your terminal")]
#[command(version)]
#[command(group(
    ArgGroup::new("action")
        .args(["setup", "delete_key", "clear_cache", "cache_info"])
        .multiple(false)
))]
pub struct Cli {
    /// Location for weather lookup (city name, postcode, or "lat,lon")
    ///
    /// If omitted, uses your current location via IP geolocation.
    ///
    /// Examples:
    ///   weather-cli                 # Weather for current location
    ///   weather-cli London          # Weather for London
    ///   weather-cli "New York"      # Quote names with spaces
    ///   weather-cli 51.5,-0.1       # Coordinates
    #[arg(value_name = "LOCATION", conflicts_with = "action")]
    pub location: Option<String>,

    /// Number of forecast days to show
    #[arg(
        long,
        short,
        default_value_t = DEFAULT_DAYS,
        value_parser = clap::value_parser!(u8).range(1..=MAX_DAYS as i64)
    )]
    pub days: u8,

    /// Skip air quality data
    #[arg(long)]
    pub no_aqi: bool,

    /// Skip weather alerts
    #[arg(long)]
    pub no_alerts: bool,

    /// Minutes a cached forecast stays fresh (0 = default of 30)
    #[arg(long, value_name = "MINUTES", default_value_t = 30)]
    pub ttl: u64,

    /// Always fetch live data and leave the cache untouched
    #[arg(long)]
    pub no_cache: bool,

    /// Disable coloured temperatures
    #[arg(long)]
    pub no_color: bool,

    /// Log cache and request activity to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Configure your Weather API key (stored in the OS keyring)
    #[arg(long)]
    pub setup: bool,

    /// Remove the stored API key from the OS keyring
    #[arg(long)]
    pub delete_key: bool,

    /// Delete all cached forecasts
    #[arg(long)]
    pub clear_cache: bool,

    /// Show the cache file location and entry counts
    #[arg(long)]
    pub cache_info: bool,

    /// Forecast endpoint override
    #[arg(long, env = "WEATHER_API_URL", hide = true)]
    pub api_url: Option<String>,
}

impl Cli {
    /// Cache freshness window; zero lets the cache pick its default
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl.saturating_mul(60))
    }
}

/// What the binary should do for this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Weather,
    Setup,
    DeleteKey,
    ClearCache,
    CacheInfo,
}

impl Command {
    /// Resolves the command from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Command)` for the selected action (a weather lookup by default)
    /// * `Err(CliError)` if the location argument is blank
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if let Some(location) = &cli.location {
            if location.trim().is_empty() {
                return Err(CliError::BlankLocation(location.clone()));
            }
        }

        let command = if cli.setup {
            Command::Setup
        } else if cli.delete_key {
            Command::DeleteKey
        } else if cli.clear_cache {
            Command::ClearCache
        } else if cli.cache_info {
            Command::CacheInfo
        } else {
            Command::Weather
        };

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["weather-cli"]);
        assert!(cli.location.is_none());
        assert_eq!(cli.days, DEFAULT_DAYS);
        assert_eq!(cli.ttl, 30);
        assert_eq!(Command::from_cli(&cli).unwrap(), Command::Weather);
    }

    #[test]
    fn test_cache_ttl_is_in_minutes() {
        let cli = Cli::parse_from(["weather-cli", "--ttl", "5"]);
        assert_eq!(cli.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_cli_parse_location() {
        let cli = Cli::parse_from(["weather-cli", "New York"]);
        assert_eq!(cli.location.as_deref(), Some("New York"));
        assert_eq!(Command::from_cli(&cli).unwrap(), Command::Weather);
    }

    #[test]
    fn test_cli_parse_days_short_flag() {
        let cli = Cli::parse_from(["weather-cli", "-d", "7", "Paris"]);
        assert_eq!(cli.days, 7);
    }

    #[test]
    fn test_cli_rejects_days_out_of_range() {
        assert!(Cli::try_parse_from(["weather-cli", "--days", "0"]).is_err());
        assert!(Cli::try_parse_from(["weather-cli", "--days", "15"]).is_err());
    }

    #[test]
    fn test_cli_actions_map_to_commands() {
        let cases = [
            ("--setup", Command::Setup),
            ("--delete-key", Command::DeleteKey),
            ("--clear-cache", Command::ClearCache),
            ("--cache-info", Command::CacheInfo),
        ];

        for (flag, expected) in cases {
            let cli = Cli::parse_from(["weather-cli", flag]);
            assert_eq!(Command::from_cli(&cli).unwrap(), expected, "flag {flag}");
        }
    }

    #[test]
    fn test_cli_rejects_multiple_actions() {
        let result = Cli::try_parse_from(["weather-cli", "--setup", "--clear-cache"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_location_with_action() {
        let result = Cli::try_parse_from(["weather-cli", "London", "--cache-info"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_location_is_an_error() {
        let cli = Cli::parse_from(["weather-cli", "   "]);
        let err = Command::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid location"));
    }
}
