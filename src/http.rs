//! Shared HTTP client construction for the external collaborators

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::TripPlannerError;

const USER_AGENT: &str = concat!("trip-planner/", env!("CARGO_PKG_VERSION"));

/// Build a client with a per-request timeout and transient-error retries
pub fn build_client(timeout_seconds: u32, max_retries: u32) -> crate::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TripPlannerError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Keep error bodies short enough for logs and user messages
#[must_use]
pub fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 300;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(400);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 303);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(5, 0).is_ok());
    }
}
