//! WeatherAPI.com forecast client
//!
//! This module fetches forecast responses over HTTPS and decodes them into
//! [`WeatherResponse`]. It is the fetch collaborator used on a cache miss.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::WeatherResponse;

/// Forecast endpoint of the WeatherAPI.com API
const WEATHER_API_BASE_URL: &str = "https://api.weatherapi.com/v1/forecast.json";

/// Upper bound on accepted response bodies (10 MiB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Weather API returned status {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Response body exceeded the size limit
    #[error("Response too large (exceeded {0} bytes)")]
    ResponseTooLarge(usize),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Parameters of a single forecast request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// City name, postcode, "lat,lon" or "auto:ip"
    pub location: String,
    /// Number of forecast days (1-14)
    pub days: u8,
    pub include_aqi: bool,
    pub alerts: bool,
}

/// Source of fresh weather data
pub trait WeatherFetcher {
    fn fetch(
        &self,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<WeatherResponse, WeatherError>> + Send;
}

/// Client for fetching forecasts from WeatherAPI.com
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_response_size: usize,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient authenticated with `api_key`
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("weather-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: WEATHER_API_BASE_URL.to_string(),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Point the client at a different forecast endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the response size limit
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    /// Fetch a forecast
    ///
    /// # Returns
    /// * `Ok(WeatherResponse)` - Forecast for the requested location
    /// * `Err(WeatherError)` - If the request, status check, or parsing fails
    pub async fn fetch_forecast(
        &self,
        options: &FetchOptions,
    ) -> Result<WeatherResponse, WeatherError> {
        let days = options.days.to_string();
        let query = [
            ("key", self.api_key.as_str()),
            ("q", options.location.as_str()),
            ("days", days.as_str()),
            ("aqi", yes_no(options.include_aqi)),
            ("alerts", yes_no(options.alerts)),
        ];

        debug!(location = %options.location, days = options.days, "Requesting forecast");
        let mut response = self.client.get(&self.base_url).query(&query).send().await?;
        let status = response.status();
        let body = read_limited(&mut response, self.max_response_size).await?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status,
                message: api_error_message(&body, status),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl WeatherFetcher for WeatherClient {
    fn fetch(
        &self,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<WeatherResponse, WeatherError>> + Send {
        self.fetch_forecast(options)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Reads the body, failing as soon as it grows past `limit` bytes
async fn read_limited(response: &mut Response, limit: usize) -> Result<Vec<u8>, WeatherError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(WeatherError::ResponseTooLarge(limit));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(WeatherError::ResponseTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Error envelope returned by the API, e.g. `{"error": {"code": 1006, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn api_error_message(body: &[u8], status: StatusCode) -> String {
    serde_json::from_slice::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string())
}
