//! Daily weather forecast model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One representative (midday) sample per calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Temperature in Celsius
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Human-readable condition, e.g. "light rain"
    pub description: String,
    pub icon: String,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Probability of precipitation in percent
    pub rain_chance: f64,
}

/// Forecast for one destination as served to the frontend
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    pub forecasts: Vec<DailyForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl WeatherReport {
    /// Placeholder report carrying only an error message
    #[must_use]
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self {
            error_msg: Some(message.into()),
            ..Self::default()
        }
    }
}

impl DailyForecast {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temp)
    }
}
