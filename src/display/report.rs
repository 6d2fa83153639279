//! Text report for a forecast response

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::style::{
    aqi_icon, border, format_temp, weather_icon, ALERT_ICON, HUMIDITY_ICON, SUNRISE_ICON,
    SUNSET_ICON, WIND_ICON,
};
use crate::data::WeatherResponse;

const TIME_FORMAT: &str = "%a, %b %-d - %H:%M";
const API_LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No forecast data available")]
    NoForecast,
}

/// Renders a [`WeatherResponse`] as terminal text
///
/// Rendering is pure: the wall clock and colour choice are inputs, so the
/// output for a given response is reproducible.
#[derive(Debug)]
pub struct Report<'a> {
    data: &'a WeatherResponse,
    /// The location was auto-detected, so local time equals machine time
    is_local: bool,
    color: bool,
    now: DateTime<Local>,
}

impl<'a> Report<'a> {
    pub fn new(data: &'a WeatherResponse, is_local: bool) -> Result<Self, ReportError> {
        if data.today().is_none() {
            return Err(ReportError::NoForecast);
        }

        Ok(Self {
            data,
            is_local,
            color: true,
            now: Local::now(),
        })
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Renders as if the machine clock read `now`
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// All sections separated by blank lines
    pub fn render(&self) -> String {
        [
            self.heading(),
            self.time(),
            self.current_conditions(),
            self.hourly_forecast(),
            self.daily_forecast(),
            self.twilight(),
            self.warnings(),
        ]
        .join("\n\n")
    }

    pub fn heading(&self) -> String {
        let location = &self.data.location;
        let title = if location.country.is_empty() {
            format!("Weather Forecast for {}", location.name)
        } else {
            format!("Weather Forecast for {}, {}", location.name, location.country)
        };
        format!("{title}\n{}", border(&title))
    }

    pub fn time(&self) -> String {
        let mut output = format!("Time: {}", self.now.format(TIME_FORMAT));

        if !self.is_local {
            if let Some(local) = self.location_time() {
                output.push_str(&format!(" (Local Time: {})", local.format(TIME_FORMAT)));
            }
        }

        output
    }

    pub fn current_conditions(&self) -> String {
        let current = &self.data.current;
        let condition = with_icon(&current.condition.text);

        let mut output = format!(
            "Current Conditions: {}, {} (Feels like {})\n",
            condition,
            format_temp(current.temperature, self.color).trim_start(),
            format_temp(current.feels_like, self.color).trim_start(),
        );

        output.push_str(&format!(
            "Wind: {} {} {:.0} mph | Humidity: {} {:.0}%",
            WIND_ICON, current.wind_direction, current.wind_mph, HUMIDITY_ICON, current.humidity
        ));

        if let Some(aqi) = &current.air_quality {
            output.push_str(&format!(
                " | AQI: {} {:.0} (PM2.5)",
                aqi_icon(aqi.pm2_5),
                aqi.pm2_5
            ));
        }

        output
    }

    /// Remaining hours of today at the forecast location
    pub fn hourly_forecast(&self) -> String {
        let Some(today) = self.data.today() else {
            return "Hourly Forecast: No data available".to_string();
        };

        let clock = self.location_time().unwrap_or_else(|| self.now.naive_local());
        let rows: Vec<String> = today
            .hour
            .iter()
            .filter_map(|hour| {
                let start = NaiveDateTime::parse_from_str(&hour.time, API_LOCAL_TIME_FORMAT).ok()?;
                (start >= clock).then(|| {
                    format!(
                        "{} | {} | {:>3.0}% | {}",
                        start.format("%H:%M"),
                        format_temp(hour.temperature, self.color),
                        hour.chance_of_rain,
                        with_icon(&hour.condition.text),
                    )
                })
            })
            .collect();

        if rows.is_empty() {
            return "Hourly Forecast: No more hours today".to_string();
        }

        let mut output = String::from("Hourly Forecast:\n");
        output.push_str(&format!("{:<5} | {:>5} | {:>4} | {}\n", "Time", "Temp", "Rain", "Condition"));
        output.push_str(&rows.join("\n"));
        output
    }

    pub fn daily_forecast(&self) -> String {
        let days = &self.data.forecast.forecastday;
        if days.is_empty() {
            return "Daily Forecast: No data available".to_string();
        }

        let rows: Vec<String> = days
            .iter()
            .map(|day| {
                let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
                    .map(|d| d.format("%a %d %b").to_string())
                    .unwrap_or_else(|_| day.date.clone());
                format!(
                    "{} | {} / {} | Rain {:>3.0}% | {}",
                    date,
                    format_temp(day.day.min_temp, self.color),
                    format_temp(day.day.max_temp, self.color),
                    day.day.chance_of_rain,
                    with_icon(&day.day.condition.text),
                )
            })
            .collect();

        format!("Daily Forecast:\n{}", rows.join("\n"))
    }

    pub fn twilight(&self) -> String {
        let Some(today) = self.data.today() else {
            return "Twilight: No data available".to_string();
        };

        let astro = &today.astro;
        if astro.sunrise.is_empty() || astro.sunset.is_empty() {
            return "Twilight: No sunrise or sunset data available".to_string();
        }

        format!(
            "Sunrise: {} {} | Sunset: {} {}",
            SUNRISE_ICON, astro.sunrise, SUNSET_ICON, astro.sunset
        )
    }

    pub fn warnings(&self) -> String {
        let alerts = &self.data.alerts.alert;
        if alerts.is_empty() {
            return "Weather Warnings: None".to_string();
        }

        let mut output = String::from("Weather Warnings:");
        for alert in alerts {
            let event = if alert.event.is_empty() {
                &alert.headline
            } else {
                &alert.event
            };
            output.push_str(&format!("\n{ALERT_ICON} {event}"));
            if !alert.severity.is_empty() {
                output.push_str(&format!(" ({})", alert.severity));
            }
        }
        output
    }

    fn location_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.data.location.local_time, API_LOCAL_TIME_FORMAT).ok()
    }
}

fn with_icon(condition: &str) -> String {
    match weather_icon(condition) {
        Some(icon) => format!("{icon} {condition}"),
        None => condition.to_string(),
    }
}
