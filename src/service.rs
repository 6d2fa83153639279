//! Weather lookup with caching
//!
//! [`WeatherService`] checks the response cache, falls back to the API on a
//! miss, and stores fresh responses. Cache failures never fail a lookup: they
//! are logged and the live response is returned.

use tracing::{debug, warn};

use crate::cache::{CacheError, ResponseCache};
use crate::data::{FetchOptions, WeatherError, WeatherFetcher, WeatherResponse};

/// Cache operations the service relies on
pub trait WeatherCache {
    fn get(&self, location: &str) -> Option<WeatherResponse>;
    fn set(&self, location: &str, data: WeatherResponse) -> Result<(), CacheError>;
}

impl WeatherCache for ResponseCache<WeatherResponse> {
    fn get(&self, location: &str) -> Option<WeatherResponse> {
        ResponseCache::get(self, location)
    }

    fn set(&self, location: &str, data: WeatherResponse) -> Result<(), CacheError> {
        ResponseCache::set(self, location, data)
    }
}

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Api,
}

/// Orchestrates cache lookups and API fetches for one query
#[derive(Debug)]
pub struct WeatherService<F, C = ResponseCache<WeatherResponse>> {
    options: FetchOptions,
    cache: Option<C>,
    fetcher: F,
}

impl<F, C> WeatherService<F, C>
where
    F: WeatherFetcher,
    C: WeatherCache,
{
    /// Creates a service; pass `None` to run without a cache
    pub fn new(options: FetchOptions, cache: Option<C>, fetcher: F) -> Self {
        Self {
            options,
            cache,
            fetcher,
        }
    }

    /// Returns the forecast, from cache when a fresh entry covers the
    /// requested number of days, otherwise from the API
    pub async fn get_weather(&self) -> Result<(WeatherResponse, Source), WeatherError> {
        let location = &self.options.location;

        if let Some(cache) = &self.cache {
            match cache.get(location) {
                Some(cached) if cached.forecast_days() >= usize::from(self.options.days) => {
                    return Ok((cached, Source::Cache));
                }
                Some(cached) => debug!(
                    cached_days = cached.forecast_days(),
                    requested_days = self.options.days,
                    "Cached forecast too short, refetching"
                ),
                None => {}
            }
        }

        let response = self.fetcher.fetch(&self.options).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(location, response.clone()) {
                warn!(error = %e, "Failed to cache weather data");
            }
        }

        Ok((response, Source::Api))
    }
}
