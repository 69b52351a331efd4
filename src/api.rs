//! JSON API served under `/api`

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::gazetteer;
use crate::itinerary::TripPlanner;
use crate::models::{TripRequest, Travelers, WeatherReport};
use crate::narrative::NarrativeProvider;
use crate::pricing::TravelCostEstimate;
use crate::routing::RouteProvider;
use crate::store::{TripRecord, TripRepository};
use crate::weather::WeatherProvider;
use crate::{TripPlannerError, VERSION};

/// Planner over type-erased collaborators, as wired by the binary
pub type Planner = TripPlanner<
    Arc<dyn RouteProvider>,
    Arc<dyn NarrativeProvider>,
    Arc<dyn WeatherProvider>,
>;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<Planner>,
    pub store: Arc<dyn TripRepository>,
}

impl AppState {
    pub fn new(planner: Planner, store: impl TripRepository + 'static) -> Self {
        Self {
            planner: Arc::new(planner),
            store: Arc::new(store),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateTripResponse {
    pub tripid: String,
    pub tripdetails: String,
    pub costs: TravelCostEstimate,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CostQuery {
    pub from: String,
    pub to: String,
    #[serde(default = "default_travelers")]
    pub travelers: i64,
}

fn default_travelers() -> i64 {
    1
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-trip", post(generate_trip))
        .route("/saved-trips", get(list_trips))
        .route("/saved-trips/{id}", get(get_trip).delete(delete_trip))
        .route("/weather/{destination}", get(get_weather))
        .route("/travel-costs", get(get_travel_costs))
        .route("/districts", get(get_districts))
        .route("/health", get(health))
        .with_state(state)
}

async fn generate_trip(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Response, TripPlannerError> {
    let trip = state.planner.generate_trip_document(&request).await?;

    match state.store.save(&trip.document).await {
        Ok(record) => {
            info!("Trip {} generated and saved", record.id);
            Ok(Json(GenerateTripResponse {
                tripid: record.id,
                tripdetails: trip.document,
                costs: trip.costs,
                message: "Trip generated successfully".to_string(),
            })
            .into_response())
        }
        Err(e) => {
            // the document is still worth returning
            error!("Failed to save generated trip: {}", e);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": e.user_message(),
                    "tripdetails": trip.document,
                    "costs": trip.costs,
                })),
            )
                .into_response())
        }
    }
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<TripRecord>>, TripPlannerError> {
    Ok(Json(state.store.list().await?))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripRecord>, TripPlannerError> {
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| TripPlannerError::not_found("Trip not found"))
}

async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, TripPlannerError> {
    if state.store.delete(&id).await? {
        Ok(Json(json!({ "message": "Trip deleted successfully" })))
    } else {
        Err(TripPlannerError::not_found("Trip not found"))
    }
}

async fn get_weather(
    State(state): State<AppState>,
    Path(destination): Path<String>,
) -> Json<WeatherReport> {
    Json(state.planner.weather_report(&destination).await)
}

async fn get_travel_costs(
    State(state): State<AppState>,
    Query(query): Query<CostQuery>,
) -> Result<Json<TravelCostEstimate>, TripPlannerError> {
    let (from, to) = (query.from.trim(), query.to.trim());
    if from.is_empty() || to.is_empty() {
        return Err(TripPlannerError::validation("from and to are required"));
    }
    let travelers = Travelers::try_from(query.travelers)?;
    Ok(Json(state.planner.estimate_costs(from, to, travelers).await))
}

async fn get_districts() -> Json<Vec<&'static str>> {
    Json(gazetteer::district_names())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}
