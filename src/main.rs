//! weather-cli - current conditions and forecast in your terminal
//!
//! Looks up a location, serves the forecast from the local response cache
//! while it is fresh, otherwise fetches it from WeatherAPI.com, and prints a
//! text report.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};

use weather_cli::cache::ResponseCache;
use weather_cli::cli::{Cli, Command};
use weather_cli::config::Config;
use weather_cli::credentials::{self, CredentialsError};
use weather_cli::data::{WeatherClient, WeatherResponse};
use weather_cli::display::Report;
use weather_cli::logging::init_logging;
use weather_cli::service::WeatherService;

/// Exit status when the user interrupts a lookup with Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    match Command::from_cli(cli)? {
        Command::Weather => return show_weather(cli).await,
        Command::Setup => credentials::run_setup().context("Setup failed")?,
        Command::DeleteKey => {
            credentials::delete_api_key().context("Failed to delete API key")?;
            println!("API key removed from OS keyring.");
        }
        Command::ClearCache => {
            let cache = open_cache(cli)?;
            cache.clear().context("Failed to clear cache")?;
            println!("Cache cleared: {}", cache.path().display());
        }
        Command::CacheInfo => {
            let cache = open_cache(cli)?;
            let stats = cache.stats();
            println!("Cache file: {}", cache.path().display());
            println!("TTL: {} minutes", cache.ttl().as_secs() / 60);
            println!(
                "Entries: {} ({} fresh, {} expired)",
                stats.total, stats.valid, stats.expired
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn show_weather(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::from_cli(cli, api_key()?);
    config.color &= io::stdout().is_terminal();
    debug!(?config, "Resolved configuration");

    let mut client =
        WeatherClient::new(config.api_key.clone()).context("Failed to create HTTP client")?;
    if let Some(url) = &config.api_url {
        client = client.with_base_url(url.clone());
    }

    let cache: Option<ResponseCache<WeatherResponse>> = if config.use_cache {
        match ResponseCache::new(config.cache_ttl) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "Cache unavailable, continuing without it");
                None
            }
        }
    } else {
        None
    };

    let service = WeatherService::new(config.fetch_options(), cache, client);

    let (data, source) = tokio::select! {
        result = service.get_weather() => result.context("Error fetching weather")?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nRequest cancelled.");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };
    debug!(?source, location = %data.location.name, "Forecast ready");

    let report = Report::new(&data, config.is_local)
        .context("Error creating display")?
        .with_color(config.color);
    println!("{}", report.render());

    Ok(ExitCode::SUCCESS)
}

/// Resolves the API key, offering interactive setup on first run
fn api_key() -> anyhow::Result<String> {
    match credentials::api_key() {
        Ok(key) => Ok(key),
        Err(CredentialsError::NoApiKey) if io::stdin().is_terminal() => {
            println!("No API key configured.");
            credentials::run_setup().context("Setup failed")?;
            Ok(credentials::api_key()?)
        }
        Err(e) => Err(e.into()),
    }
}

fn open_cache(cli: &Cli) -> anyhow::Result<ResponseCache<WeatherResponse>> {
    ResponseCache::new(cli.cache_ttl()).context("Cache directory unavailable")
}
