//! Configuration management for the trip planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripPlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the trip planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Driving-route collaborator (OpenRouteService)
    pub routing: RoutingConfig,
    /// Text-generation collaborator (Groq chat completions)
    pub narrative: NarrativeConfig,
    /// Weather collaborator (OpenWeatherMap)
    pub weather: WeatherConfig,
    /// Itinerary generation settings
    pub planner: PlannerSettings,
    /// Trip store and cache location
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whole-request timeout in seconds
    pub request_timeout_seconds: u32,
    /// Maximum accepted request body in KB
    pub body_limit_kb: u32,
    /// Allowed CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
    /// PEM certificate, only used with the `tls` feature
    pub tls_cert_path: Option<String>,
    /// PEM private key, only used with the `tls` feature
    pub tls_key_path: Option<String>,
}

/// Driving-route collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u32,
    pub max_retries: u32,
    /// Route cache TTL in hours, 0 disables caching
    pub cache_ttl_hours: u32,
}

/// Text-generation collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u32,
    pub max_retries: u32,
}

/// Weather collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u32,
    pub max_retries: u32,
}

/// Itinerary generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Upper bound for any single collaborator call in seconds
    pub collaborator_timeout_seconds: u32,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the trip store and the route cache
    pub data_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_request_timeout() -> u32 {
    120
}

fn default_body_limit() -> u32 {
    64
}

fn default_routing_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_narrative_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_narrative_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_collaborator_timeout() -> u32 {
    30
}

fn default_timeout() -> u32 {
    20
}

fn default_max_retries() -> u32 {
    2
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            body_limit_kb: default_body_limit(),
            allowed_origins: Vec::new(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_routing_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            cache_ttl_hours: 0,
        }
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_narrative_base_url(),
            model: default_narrative_model(),
            timeout_seconds: default_collaborator_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            collaborator_timeout_seconds: default_collaborator_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var("TRIP_PLANNER_CONFIG").ok().map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIP_PLANNER__ROUTING__API_KEY -> routing.api_key
        builder = builder.add_source(
            Environment::with_prefix("TRIP_PLANNER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.apply_legacy_env_keys();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trip-planner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.routing.base_url.is_empty() {
            self.routing.base_url = default_routing_base_url();
        }
        if self.routing.timeout_seconds == 0 {
            self.routing.timeout_seconds = default_timeout();
        }
        if self.narrative.base_url.is_empty() {
            self.narrative.base_url = default_narrative_base_url();
        }
        if self.narrative.model.is_empty() {
            self.narrative.model = default_narrative_model();
        }
        if self.narrative.timeout_seconds == 0 {
            self.narrative.timeout_seconds = default_collaborator_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.planner.collaborator_timeout_seconds == 0 {
            self.planner.collaborator_timeout_seconds = default_collaborator_timeout();
        }
        if self.storage.data_dir.is_empty() {
            self.storage.data_dir = default_data_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Fill missing API keys from the plain provider variables
    /// (`OPENROUTE_API_KEY`, `GROQ_API_KEY`, `OPENWEATHER_API_KEY`)
    pub fn apply_legacy_env_keys(&mut self) {
        fn from_env(slot: &mut Option<String>, var: &str) {
            if slot.is_none() {
                *slot = std::env::var(var).ok().filter(|v| !v.is_empty());
            }
        }
        from_env(&mut self.routing.api_key, "OPENROUTE_API_KEY");
        from_env(&mut self.narrative.api_key, "GROQ_API_KEY");
        from_env(&mut self.weather.api_key, "OPENWEATHER_API_KEY");
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Keys are optional (a missing one degrades or fails at call time),
    /// but a configured key must not be blank.
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Routing", &self.routing.api_key),
            ("Narrative", &self.narrative.api_key),
            ("Weather", &self.weather.api_key),
        ];
        for (name, key) in keys {
            if let Some(key) = key {
                if key.trim().is_empty() {
                    return Err(TripPlannerError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Routing", self.routing.timeout_seconds),
            ("Narrative", self.narrative.timeout_seconds),
            ("Weather", self.weather.timeout_seconds),
            ("Collaborator", self.planner.collaborator_timeout_seconds),
        ];
        for (name, timeout) in timeouts {
            if timeout > 300 {
                return Err(TripPlannerError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        let retries = [
            ("Routing", self.routing.max_retries),
            ("Narrative", self.narrative.max_retries),
            ("Weather", self.weather.max_retries),
        ];
        for (name, max_retries) in retries {
            if max_retries > 10 {
                return Err(TripPlannerError::config(format!(
                    "{name} max retries cannot exceed 10"
                ))
                .into());
            }
        }

        if self.routing.cache_ttl_hours > 24 * 30 {
            return Err(
                TripPlannerError::config("Route cache TTL cannot exceed 720 hours").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Routing", &self.routing.base_url),
            ("Narrative", &self.narrative.base_url),
            ("Weather", &self.weather.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
