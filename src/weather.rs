//! Weather forecasts from OpenWeatherMap
//!
//! The 5-day / 3-hour forecast is reduced to one midday sample per day and
//! rendered as the "Weather Information" block of a trip document.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Timelike};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::{DailyForecast, WeatherReport};
use crate::{Result, TripPlannerError, http};

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, place: &str) -> Result<WeatherReport>;
}

#[async_trait]
impl<T: WeatherProvider + ?Sized> WeatherProvider for Arc<T> {
    async fn forecast(&self, place: &str) -> Result<WeatherReport> {
        (**self).forecast(place).await
    }
}

pub struct OpenWeatherMapClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherMapClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn forecast(&self, place: &str) -> Result<WeatherReport> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripPlannerError::config("OPENWEATHER_API_KEY not set"))?;

        info!("Getting forecast for '{}'", place);
        let start_time = Instant::now();

        let url = format!(
            "{}/data/2.5/forecast?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(place),
            urlencoding::encode(api_key)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TripPlannerError::api(format!("Failed to fetch weather data: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TripPlannerError::api(format!(
                "weather API error ({}): {}",
                status.as_u16(),
                http::truncate_body(&text)
            )));
        }

        let response: ForecastResponse = response
            .json()
            .await
            .map_err(|e| TripPlannerError::api(format!("Failed to parse weather data: {e}")))?;

        let report = response.into_report();
        debug!(
            "Retrieved {} daily samples in {:.3}s",
            report.forecasts.len(),
            start_time.elapsed().as_secs_f64()
        );
        if report.forecasts.is_empty() {
            warn!("Forecast for '{}' contained no midday samples", place);
        }
        Ok(report)
    }
}

/// Shown in place of the forecast when the weather lookup fails
#[must_use]
pub fn weather_unavailable_notice(place: &str) -> String {
    format!("\n⚠️ Weather information not available for {place}\n")
}

/// Markdown block for the trip document
#[must_use]
pub fn format_weather_block(report: &WeatherReport) -> String {
    if let Some(message) = &report.error_msg {
        return format!("\n⚠️ {message}\n");
    }

    let mut out = format!(
        "\n🌤️ **Weather Forecast for {}, {}**\n\n",
        report.city, report.country
    );

    for day in &report.forecasts {
        let _ = writeln!(out, "**{}:**", day.date.format("%Y-%m-%d"));
        let _ = writeln!(
            out,
            "- Temperature: {} (Feels like: {:.1}°C)",
            day.format_temperature(),
            day.feels_like
        );
        let _ = writeln!(out, "- High/Low: {:.1}°C / {:.1}°C", day.temp_max, day.temp_min);
        let _ = writeln!(out, "- Condition: {}", day.description);
        let _ = writeln!(out, "- Humidity: {}%", day.humidity);
        let _ = writeln!(out, "- Wind Speed: {:.1} m/s", day.wind_speed);
        let _ = writeln!(out, "- Rain Chance: {:.0}%\n", day.rain_chance);
    }

    out.push_str("💡 **Weather Tips:**\n");
    out.push_str("- Check weather updates closer to your travel dates\n");
    out.push_str("- Pack accordingly based on the forecast\n");
    out.push_str("- Consider weather when planning outdoor activities\n\n");
    out
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    city: City,
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct City {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    /// Shift from UTC in seconds
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Wind,
    /// Probability of precipitation, 0..1
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
}

impl ForecastResponse {
    /// First sample between 11:00 and 14:00 local time for each date
    fn into_report(self) -> WeatherReport {
        let offset = self.city.timezone;
        let mut seen = HashSet::new();
        let mut forecasts = Vec::new();

        for item in self.list {
            let Some(local) = DateTime::from_timestamp(item.dt + offset, 0) else {
                continue;
            };
            let date = local.date_naive();
            if !(11..=14).contains(&local.hour()) || seen.contains(&date) {
                continue;
            }
            seen.insert(date);

            let (description, icon) = item
                .weather
                .into_iter()
                .next()
                .map(|c| (c.description, c.icon))
                .unwrap_or_else(|| ("unknown".to_string(), String::new()));

            forecasts.push(DailyForecast {
                date,
                temp: item.main.temp,
                feels_like: item.main.feels_like,
                temp_min: item.main.temp_min,
                temp_max: item.main.temp_max,
                humidity: item.main.humidity,
                description,
                icon,
                wind_speed: item.wind.speed,
                rain_chance: item.pop * 100.0,
            });
        }

        WeatherReport {
            city: self.city.name,
            country: self.city.country,
            forecasts,
            error_msg: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"{
        "city": {"name": "Mysore", "country": "IN", "timezone": 19800},
        "list": [
            {"dt": 1767243600, "main": {"temp": 21.0, "feels_like": 21.2, "temp_min": 20.1, "temp_max": 21.5, "humidity": 70},
             "weather": [{"main": "Clouds", "description": "scattered clouds", "icon": "03d"}], "wind": {"speed": 2.1}, "pop": 0.0},
            {"dt": 1767254400, "main": {"temp": 28.4, "feels_like": 28.9, "temp_min": 27.0, "temp_max": 29.1, "humidity": 45},
             "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}], "wind": {"speed": 3.4}, "pop": 0.12},
            {"dt": 1767265200, "main": {"temp": 29.0, "feels_like": 29.5, "temp_min": 28.0, "temp_max": 29.6, "humidity": 40},
             "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}], "wind": {"speed": 3.9}, "pop": 0.0},
            {"dt": 1767340800, "main": {"temp": 27.1, "feels_like": 27.3, "temp_min": 26.0, "temp_max": 27.9, "humidity": 50},
             "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}], "wind": {"speed": 4.2}, "pop": 0.65}
        ]
    }"#;

    fn config(base_url: &str) -> WeatherConfig {
        WeatherConfig {
            api_key: Some("weather-key".to_string()),
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            max_retries: 0,
        }
    }

    #[test]
    fn test_one_midday_sample_per_day() {
        let response: ForecastResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = response.into_report();

        assert_eq!(report.city, "Mysore");
        assert_eq!(report.country, "IN");
        assert_eq!(report.forecasts.len(), 2);

        let first = &report.forecasts[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(first.temp, 28.4);
        assert_eq!(first.description, "clear sky");
        assert!((first.rain_chance - 12.0).abs() < 1e-9);

        let second = &report.forecasts[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(second.description, "light rain");
    }

    #[test]
    fn test_format_weather_block() {
        let response: ForecastResponse = serde_json::from_str(SAMPLE).unwrap();
        let block = format_weather_block(&response.into_report());

        assert!(block.contains("**Weather Forecast for Mysore, IN**"));
        assert!(block.contains("**2026-01-01:**"));
        assert!(block.contains("- Temperature: 28.4°C (Feels like: 28.9°C)"));
        assert!(block.contains("- High/Low: 29.1°C / 27.0°C"));
        assert!(block.contains("- Rain Chance: 65%"));
        assert!(block.contains("**Weather Tips:**"));
    }

    #[test]
    fn test_error_report_renders_notice() {
        let block = format_weather_block(&WeatherReport::unavailable("Weather data not available"));
        assert!(block.contains("⚠️ Weather data not available"));
        assert!(!block.contains("Weather Tips"));
    }

    #[tokio::test]
    async fn test_client_fetches_forecast() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data/2.5/forecast")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "Mysuru (Mysore)".into()),
                mockito::Matcher::UrlEncoded("appid".into(), "weather-key".into()),
                mockito::Matcher::UrlEncoded("units".into(), "metric".into()),
            ]))
            .with_status(200)
            .with_body(SAMPLE)
            .create_async()
            .await;

        let client = OpenWeatherMapClient::new(&config(&server.url())).unwrap();
        let report = client.forecast("Mysuru (Mysore)").await.unwrap();

        mock.assert_async().await;
        assert_eq!(report.forecasts.len(), 2);
    }

    #[tokio::test]
    async fn test_client_reports_http_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data/2.5/forecast")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body(r#"{"cod":"404","message":"city not found"}"#)
            .create_async()
            .await;

        let client = OpenWeatherMapClient::new(&config(&server.url())).unwrap();
        let err = client.forecast("Nowhere").await.unwrap_err();
        assert!(err.to_string().contains("city not found"));
    }

    #[tokio::test]
    async fn test_client_without_key() {
        let mut cfg = config("http://127.0.0.1:9");
        cfg.api_key = None;
        let client = OpenWeatherMapClient::new(&cfg).unwrap();
        let err = client.forecast("Udupi").await.unwrap_err();
        assert!(matches!(err, TripPlannerError::Config { .. }));
    }
}
