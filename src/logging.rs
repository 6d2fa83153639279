//! Logging setup for weather-cli
//!
//! Diagnostics go to stderr so the report on stdout stays clean. The level is
//! taken from `RUST_LOG` when set, otherwise warnings only (debug with
//! `--verbose`).

use std::io;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "weather_cli=warn";
const VERBOSE_FILTER: &str = "weather_cli=debug";

/// Installs the global tracing subscriber
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
