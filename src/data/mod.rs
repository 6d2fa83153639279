//! Weather data models and API client
//!
//! The types in this module mirror the WeatherAPI.com forecast response. A
//! [`WeatherResponse`] is what the cache stores and what the report renders,
//! so every type round-trips through JSON unchanged.

pub mod weather;

pub use weather::{FetchOptions, WeatherClient, WeatherError, WeatherFetcher};

use serde::{Deserialize, Serialize};

/// Complete forecast response for one location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherResponse {
    pub location: Location,
    pub current: Current,
    pub forecast: Forecast,
    pub alerts: Alerts,
}

impl WeatherResponse {
    /// Number of forecast days contained in the response
    pub fn forecast_days(&self) -> usize {
        self.forecast.forecastday.len()
    }

    /// Today's forecast, if the response contains any days
    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast.forecastday.first()
    }
}

/// Resolved location the forecast applies to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    /// Local wall-clock time at the location, e.g. "2024-07-15 14:05"
    #[serde(rename = "localtime")]
    pub local_time: String,
}

/// Conditions right now
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Current {
    #[serde(rename = "temp_c")]
    pub temperature: f64,
    #[serde(rename = "feelslike_c")]
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: f64,
    pub wind_mph: f64,
    pub wind_kph: f64,
    #[serde(rename = "wind_dir")]
    pub wind_direction: String,
    pub condition: Condition,
    /// Present only when air quality was requested
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub text: String,
    pub code: u32,
}

/// Pollutant concentrations in μg/m³
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQuality {
    pub pm2_5: f64,
    pub pm10: f64,
    #[serde(rename = "us-epa-index")]
    pub us_epa_index: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

/// Forecast for a single calendar day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastDay {
    /// Date in "YYYY-MM-DD" form
    pub date: String,
    pub date_epoch: i64,
    pub day: Day,
    pub astro: Astro,
    pub hour: Vec<Hour>,
}

/// Daily summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Day {
    #[serde(rename = "maxtemp_c")]
    pub max_temp: f64,
    #[serde(rename = "mintemp_c")]
    pub min_temp: f64,
    #[serde(rename = "avgtemp_c")]
    pub avg_temp: f64,
    #[serde(rename = "maxwind_mph")]
    pub max_wind_mph: f64,
    #[serde(rename = "totalprecip_mm")]
    pub total_precip_mm: f64,
    #[serde(rename = "avghumidity")]
    pub avg_humidity: f64,
    #[serde(rename = "daily_chance_of_rain")]
    pub chance_of_rain: f64,
    #[serde(rename = "daily_chance_of_snow")]
    pub chance_of_snow: f64,
    pub condition: Condition,
    pub uv: f64,
}

/// Forecast for a single hour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hour {
    /// Start of the hour as a Unix timestamp
    pub time_epoch: i64,
    pub time: String,
    #[serde(rename = "temp_c")]
    pub temperature: f64,
    pub condition: Condition,
    pub chance_of_rain: f64,
    pub chance_of_snow: f64,
}

/// Sun and moon times, as local "hh:mm AM" strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerts {
    pub alert: Vec<Alert>,
}

/// A government-issued weather alert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub headline: String,
    pub severity: String,
    pub event: String,
    #[serde(rename = "desc")]
    pub description: String,
}

/// Trimmed WeatherAPI.com forecast response used across the test suites
#[cfg(test)]
pub(crate) const SAMPLE_FORECAST: &str = r#"{
    "location": {
        "name": "London",
        "region": "City of London, Greater London",
        "country": "United Kingdom",
        "lat": 51.52,
        "lon": -0.11,
        "tz_id": "Europe/London",
        "localtime_epoch": 1721048700,
        "localtime": "2024-07-15 14:05"
    },
    "current": {
        "temp_c": 21.0,
        "feelslike_c": 21.4,
        "humidity": 56,
        "wind_mph": 9.4,
        "wind_kph": 15.1,
        "wind_dir": "WSW",
        "condition": { "text": "Partly cloudy", "icon": "//cdn/116.png", "code": 1003 },
        "air_quality": { "co": 230.3, "pm2_5": 7.2, "pm10": 9.1, "us-epa-index": 1 }
    },
    "forecast": {
        "forecastday": [
            {
                "date": "2024-07-15",
                "date_epoch": 1721001600,
                "day": {
                    "maxtemp_c": 22.3,
                    "mintemp_c": 14.1,
                    "avgtemp_c": 18.0,
                    "maxwind_mph": 11.2,
                    "totalprecip_mm": 0.4,
                    "avghumidity": 68,
                    "daily_chance_of_rain": 74,
                    "daily_chance_of_snow": 0,
                    "condition": { "text": "Patchy rain nearby", "code": 1063 },
                    "uv": 5.0
                },
                "astro": {
                    "sunrise": "05:01 AM",
                    "sunset": "09:12 PM",
                    "moonrise": "03:15 PM",
                    "moonset": "12:42 AM",
                    "moon_phase": "Waxing Gibbous"
                },
                "hour": [
                    {
                        "time_epoch": 1721048400,
                        "time": "2024-07-15 14:00",
                        "temp_c": 21.0,
                        "condition": { "text": "Partly cloudy", "code": 1003 },
                        "chance_of_rain": 0,
                        "chance_of_snow": 0
                    },
                    {
                        "time_epoch": 1721052000,
                        "time": "2024-07-15 15:00",
                        "temp_c": 21.6,
                        "condition": { "text": "Patchy rain nearby", "code": 1063 },
                        "chance_of_rain": 74,
                        "chance_of_snow": 0
                    }
                ]
            },
            {
                "date": "2024-07-16",
                "date_epoch": 1721088000,
                "day": {
                    "maxtemp_c": 24.8,
                    "mintemp_c": 13.6,
                    "avgtemp_c": 18.9,
                    "daily_chance_of_rain": 0,
                    "condition": { "text": "Sunny", "code": 1000 },
                    "uv": 6.0
                },
                "astro": { "sunrise": "05:02 AM", "sunset": "09:11 PM" },
                "hour": []
            }
        ]
    },
    "alerts": {
        "alert": [
            {
                "headline": "Met Office yellow warning",
                "severity": "Moderate",
                "event": "Yellow Thunderstorm Warning",
                "desc": "Thunderstorms may cause travel disruption."
            }
        ]
    }
}"#;
