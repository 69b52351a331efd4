//! Driving-route lookups against OpenRouteService

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngExt;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::cache::PersistentCache;
use crate::config::RoutingConfig;
use crate::models::Coordinates;
use crate::{Result, TripPlannerError, http};

/// Driving route summary as reported by the routing collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl Route {
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.duration_seconds / 3600.0
    }
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, from: Coordinates, to: Coordinates) -> Result<Route>;
}

#[async_trait]
impl<T: RouteProvider + ?Sized> RouteProvider for Arc<T> {
    async fn route(&self, from: Coordinates, to: Coordinates) -> Result<Route> {
        (**self).route(from, to).await
    }
}

pub struct OpenRouteServiceClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
}

impl OpenRouteServiceClient {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl RouteProvider for OpenRouteServiceClient {
    #[instrument(skip(self))]
    async fn route(&self, from: Coordinates, to: Coordinates) -> Result<Route> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripPlannerError::config("OPENROUTE_API_KEY not set"))?;

        // OpenRouteService expects [longitude, latitude] pairs
        let body = json!({
            "coordinates": [
                [from.longitude, from.latitude],
                [to.longitude, to.latitude],
            ]
        });
        let body = serde_json::to_vec(&body)
            .map_err(|e| TripPlannerError::general(format!("Failed to encode route request: {e}")))?;

        tracing::debug!("Calling the routing API");
        let response = self
            .client
            .post(format!("{}/v2/directions/driving-car", self.base_url))
            .header(reqwest::header::AUTHORIZATION, api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TripPlannerError::api(format!("OpenRouteService request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("OpenRouteService error: {}", http::truncate_body(&text));
            return Err(TripPlannerError::api(format!(
                "OpenRouteService API error: {}",
                status.as_u16()
            )));
        }

        let response: ApiResponse = response.json().await.map_err(|e| {
            TripPlannerError::api(format!("Invalid OpenRouteService response: {e}"))
        })?;

        response
            .routes
            .first()
            .map(|route| Route {
                distance_meters: route.summary.distance,
                duration_seconds: route.summary.duration,
            })
            .ok_or_else(|| TripPlannerError::api("no route found"))
    }
}

/// Remembers routes between identical coordinate pairs for a jittered TTL
pub struct CachedRouteProvider<P> {
    inner: P,
    cache: PersistentCache,
    ttl: Duration,
}

impl<P: RouteProvider> CachedRouteProvider<P> {
    pub fn new(inner: P, cache: PersistentCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn key(from: Coordinates, to: Coordinates) -> String {
        format!("route:{}-{}", from.to_key(), to.to_key())
    }
}

#[async_trait]
impl<P: RouteProvider> RouteProvider for CachedRouteProvider<P> {
    #[instrument(skip(self))]
    async fn route(&self, from: Coordinates, to: Coordinates) -> Result<Route> {
        let key = Self::key(from, to);

        match self.cache.get::<Route>(&key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => tracing::warn!("Route cache read failed: {e:#}"),
        }

        let route = self.inner.route(from, to).await?;

        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        let ttl = Duration::from_secs_f64(self.ttl.as_secs_f64() * jitter);
        if let Err(e) = self.cache.put(&key, route, ttl).await {
            tracing::warn!("Route cache write failed: {e:#}");
        }
        Ok(route)
    }
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    summary: RouteSummary,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    routes: Vec<RouteResponse>,
}
