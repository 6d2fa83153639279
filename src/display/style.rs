//! Icons and colours used by the text report

use crossterm::style::{Color, ContentStyle};

pub const WIND_ICON: &str = "🍃";
pub const HUMIDITY_ICON: &str = "💧";
pub const SUNRISE_ICON: &str = "🌅";
pub const SUNSET_ICON: &str = "🌇";
pub const ALERT_ICON: &str = "⚠️";

const AQI_GOOD: f64 = 50.0;
const AQI_MODERATE: f64 = 100.0;
const AQI_SENSITIVE: f64 = 150.0;
const AQI_UNHEALTHY: f64 = 200.0;
const AQI_VERY_UNHEALTHY: f64 = 300.0;

/// Emoji for a WeatherAPI condition text such as "Patchy rain nearby"
///
/// Returns `None` for conditions without a known icon.
pub fn weather_icon(condition: &str) -> Option<&'static str> {
    let key = condition.trim().to_lowercase().replace(' ', "_");

    let icon = match key.as_str() {
        "clear" => "🌃",
        "sunny" => "☀️",
        "partly_cloudy" => "⛅",
        "cloudy" | "overcast" => "☁️",
        "mist" | "fog" => "🌫️",
        "freezing_fog" => "🌫️🧊",
        "thundery_outbreaks_possible" | "thundery_outbreaks_in_nearby" => "🌩️",
        "patchy_light_rain_with_thunder" | "moderate_or_heavy_rain_with_thunder" => "⛈️",
        "patchy_light_snow_with_thunder" | "moderate_or_heavy_snow_with_thunder" => "🌩️❄️",
        "blizzard" => "🌨️💨",
        "patchy_sleet_possible" | "patchy_sleet_nearby" => "🌧️❄️",
        "ice_pellets" => "🧊",
        _ if key.contains("freezing") || key.contains("sleet") || key.contains("ice_pellets") => {
            "🌧️🧊"
        }
        _ if key.contains("snow") => "🌨️",
        _ if key.contains("rain") || key.contains("drizzle") => "🌧️",
        _ => return None,
    };
    Some(icon)
}

/// Coloured dot for a PM2.5 reading, banded like the US AQI scale
pub fn aqi_icon(pm2_5: f64) -> &'static str {
    match pm2_5 {
        v if v < 0.0 || v.is_nan() => "❓",
        v if v <= AQI_GOOD => "🟢",
        v if v <= AQI_MODERATE => "🟡",
        v if v <= AQI_SENSITIVE => "🟠",
        v if v <= AQI_UNHEALTHY => "🔴",
        v if v <= AQI_VERY_UNHEALTHY => "🟣",
        _ => "💀",
    }
}

/// Temperature gradient from cold blues to hot reds, keyed by the upper bound
/// of each band in Fahrenheit
const TEMP_COLORS: &[(f64, (u8, u8, u8))] = &[
    (-60.0, (228, 240, 255)),
    (-50.0, (211, 226, 247)),
    (-40.0, (192, 213, 237)),
    (-30.0, (176, 199, 231)),
    (-20.0, (157, 184, 222)),
    (-10.0, (136, 165, 206)),
    (0.0, (118, 145, 185)),
    (10.0, (86, 114, 156)),
    (20.0, (65, 93, 135)),
    (30.0, (47, 72, 117)),
    (40.0, (36, 79, 120)),
    (45.0, (39, 92, 128)),
    (50.0, (39, 103, 138)),
    (55.0, (39, 117, 147)),
    (60.0, (68, 128, 144)),
    (65.0, (100, 141, 137)),
    (70.0, (135, 155, 132)),
    (75.0, (172, 168, 125)),
    (80.0, (195, 171, 117)),
    (85.0, (191, 159, 104)),
    (90.0, (195, 139, 83)),
    (95.0, (193, 111, 74)),
    (100.0, (175, 77, 78)),
    (105.0, (159, 41, 76)),
    (110.0, (135, 32, 62)),
    (120.0, (87, 11, 37)),
    (150.0, (61, 2, 22)),
];

fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Foreground colour for a temperature in Celsius
pub fn temp_color(celsius: f64) -> Color {
    let fahrenheit = celsius_to_fahrenheit(celsius);
    let (r, g, b) = TEMP_COLORS
        .iter()
        .find(|(max, _)| fahrenheit <= *max)
        .or_else(|| TEMP_COLORS.last())
        .map(|(_, rgb)| *rgb)
        .unwrap_or((255, 255, 255));

    Color::Rgb { r, g, b }
}

/// Formats a temperature as a right-aligned "NN°C", coloured if requested
pub fn format_temp(celsius: f64, color: bool) -> String {
    let text = format!("{celsius:>3.0}°C");
    if !color {
        return text;
    }

    let mut style = ContentStyle::new();
    style.foreground_color = Some(temp_color(celsius));
    style.apply(text).to_string()
}

/// Underline of `-` matching the visible width of `text`
pub fn border(text: &str) -> String {
    "-".repeat(text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_icon_known_conditions() {
        assert_eq!(weather_icon("Sunny"), Some("☀️"));
        assert_eq!(weather_icon(" Partly cloudy "), Some("⛅"));
        assert_eq!(weather_icon("Patchy rain nearby"), Some("🌧️"));
        assert_eq!(weather_icon("Moderate snow"), Some("🌨️"));
        assert_eq!(weather_icon("Light freezing rain"), Some("🌧️🧊"));
        assert_eq!(weather_icon("Moderate or heavy rain with thunder"), Some("⛈️"));
    }

    #[test]
    fn test_weather_icon_unknown_condition() {
        assert_eq!(weather_icon("Volcanic ash"), None);
        assert_eq!(weather_icon(""), None);
    }

    #[test]
    fn test_aqi_icon_bands() {
        assert_eq!(aqi_icon(7.2), "🟢");
        assert_eq!(aqi_icon(50.0), "🟢");
        assert_eq!(aqi_icon(75.0), "🟡");
        assert_eq!(aqi_icon(120.0), "🟠");
        assert_eq!(aqi_icon(180.0), "🔴");
        assert_eq!(aqi_icon(250.0), "🟣");
        assert_eq!(aqi_icon(400.0), "💀");
        assert_eq!(aqi_icon(-1.0), "❓");
    }

    #[test]
    fn test_temp_color_gradient_ends() {
        assert_eq!(temp_color(-60.0), Color::Rgb { r: 228, g: 240, b: 255 });
        assert_eq!(temp_color(100.0), Color::Rgb { r: 61, g: 2, b: 22 });
    }

    #[test]
    fn test_temp_color_uses_fahrenheit_bands() {
        // 21°C is 69.8°F, inside the 65-70°F band
        assert_eq!(temp_color(21.0), Color::Rgb { r: 135, g: 155, b: 132 });
        // 0°C is exactly 32°F, inside the 30-40°F band
        assert_eq!(temp_color(0.0), Color::Rgb { r: 36, g: 79, b: 120 });
    }

    #[test]
    fn test_format_temp_plain() {
        assert_eq!(format_temp(21.4, false), " 21°C");
        assert_eq!(format_temp(-5.0, false), " -5°C");
    }

    #[test]
    fn test_format_temp_coloured_contains_text() {
        let coloured = format_temp(21.0, true);
        assert!(coloured.contains(" 21°C"));
    }

    #[test]
    fn test_border_matches_char_count() {
        assert_eq!(border("São Paulo"), "---------");
    }
}
