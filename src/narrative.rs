//! Itinerary text generation through Groq's OpenAI-compatible chat API

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::NarrativeConfig;
use crate::{Result, TripPlannerError, http};

#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// Generate text for a system and user prompt pair
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[async_trait]
impl<T: NarrativeProvider + ?Sized> NarrativeProvider for Arc<T> {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user).await
    }
}

pub struct GroqClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GroqClient {
    pub fn new(config: &NarrativeConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl NarrativeProvider for GroqClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripPlannerError::config("GROQ_API_KEY not set"))?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| TripPlannerError::general(format!("Failed to encode chat request: {e}")))?;

        info!("Requesting itinerary narrative");
        let start_time = Instant::now();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {api_key}"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TripPlannerError::api(format!("groq request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TripPlannerError::api(format!(
                "groq API error: {}",
                http::truncate_body(&text)
            )));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| TripPlannerError::api(format!("Invalid groq response: {e}")))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TripPlannerError::api("no response from Groq API"))?;

        debug!(
            "Narrative of {} chars generated in {:.3}s",
            content.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(base_url: &str) -> NarrativeConfig {
        NarrativeConfig {
            api_key: Some("gsk_test".to_string()),
            base_url: base_url.to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_seconds: 5,
            max_retries: 0,
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk_test")
            .match_body(mockito::Matcher::Json(json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "plan a trip"}
                ]
            })))
            .with_status(200)
            .with_body(
                r##"{"choices":[{"message":{"role":"assistant","content":"# Trip to Udupi"}},
                               {"message":{"role":"assistant","content":"ignored"}}]}"##,
            )
            .create_async()
            .await;

        let client = GroqClient::new(&config(&server.url())).unwrap();
        let text = client.complete("be brief", "plan a trip").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "# Trip to Udupi");
    }

    #[tokio::test]
    async fn test_no_choices_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = GroqClient::new(&config(&server.url())).unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(err.to_string().contains("no response from Groq API"));
    }

    #[tokio::test]
    async fn test_upstream_error_body_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
            .create_async()
            .await;

        let client = GroqClient::new(&config(&server.url())).unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, TripPlannerError::Api { .. }));
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let mut cfg = config("http://127.0.0.1:9");
        cfg.api_key = None;
        let err = GroqClient::new(&cfg).unwrap().complete("s", "u").await.unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY not set"));
    }
}
