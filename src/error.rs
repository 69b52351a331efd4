//! Error types and handling for the trip planner

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Errors returned by an external collaborator (routing, LLM, weather)
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A requested resource does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Trip store and cache errors
    #[error("Storage error: {message}")]
    Store { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// HTTP status used when the error reaches the web layer
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            TripPlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            TripPlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::Config { .. } => {
                "Service is not configured correctly. Please contact the administrator."
                    .to_string()
            }
            TripPlannerError::Api { message } => {
                format!("Error generating trip: {message}")
            }
            TripPlannerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripPlannerError::NotFound { message } => message.clone(),
            TripPlannerError::Store { .. } => "Error saving trip".to_string(),
            TripPlannerError::General { message } => message.clone(),
        }
    }
}

impl From<anyhow::Error> for TripPlannerError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<TripPlannerError>() {
            Ok(inner) => inner,
            Err(other) => TripPlannerError::general(format!("{other:#}")),
        }
    }
}

impl IntoResponse for TripPlannerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TripPlannerError::config("missing API key");
        assert!(matches!(config_err, TripPlannerError::Config { .. }));

        let api_err = TripPlannerError::api("connection failed");
        assert!(matches!(api_err, TripPlannerError::Api { .. }));

        let validation_err = TripPlannerError::validation("num_travelers must be positive");
        assert!(matches!(validation_err, TripPlannerError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let api_err = TripPlannerError::api("no response from Groq API");
        assert!(api_err.user_message().contains("Error generating trip"));

        let validation_err = TripPlannerError::validation("bad date");
        assert!(validation_err.user_message().contains("bad date"));

        let store_err = TripPlannerError::store("disk full");
        assert_eq!(store_err.user_message(), "Error saving trip");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TripPlannerError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TripPlannerError::not_found("Trip not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TripPlannerError::api("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_variant() {
        let err: anyhow::Error = TripPlannerError::validation("x").into();
        let back: TripPlannerError = err.into();
        assert!(matches!(back, TripPlannerError::Validation { .. }));
    }
}
