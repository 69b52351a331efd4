//! End-to-end tests: real HTTP clients against mocked collaborators,
//! driven through the full router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use trip_planner::config::{NarrativeConfig, RoutingConfig, ServerConfig, WeatherConfig};
use trip_planner::{
    AppState, GroqClient, NarrativeProvider, OpenRouteServiceClient, OpenWeatherMapClient,
    RouteProvider, TripPlanner, TripStore, WeatherProvider, web,
};

const FORECAST: &str = r#"{
    "city": {"name": "Mysore", "country": "IN", "timezone": 19800},
    "list": [
        {"dt": 1772352000, "main": {"temp": 31.4, "feels_like": 32.0, "temp_min": 30.0, "temp_max": 32.2, "humidity": 35},
         "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}], "wind": {"speed": 3.1}, "pop": 0.05}
    ]
}"#;

struct TestApp {
    router: Router,
    _server: mockito::ServerGuard,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new(narrative_status: usize) -> Self {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("POST", "/v2/directions/driving-car")
            .with_status(200)
            .with_body(r#"{"routes":[{"summary":{"distance":145300.0,"duration":12600.0}}]}"#)
            .create_async()
            .await;

        let narrative_body = if narrative_status == 200 {
            json!({"choices": [{"message": {"role": "assistant", "content": "# Trip to Mysuru (Mysore)\n\n## Day 1: Journey to Mysuru (Mysore)"}}]})
                .to_string()
        } else {
            r#"{"error":{"message":"model overloaded"}}"#.to_string()
        };
        server
            .mock("POST", "/chat/completions")
            .with_status(narrative_status)
            .with_body(narrative_body)
            .create_async()
            .await;

        server
            .mock("GET", "/data/2.5/forecast")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(FORECAST)
            .create_async()
            .await;

        let url = server.url();
        let routes = OpenRouteServiceClient::new(&RoutingConfig {
            api_key: Some("ors-key".to_string()),
            base_url: url.clone(),
            timeout_seconds: 5,
            max_retries: 0,
            cache_ttl_hours: 0,
        })
        .unwrap();
        let narrative = GroqClient::new(&NarrativeConfig {
            api_key: Some("groq-key".to_string()),
            base_url: url.clone(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_seconds: 5,
            max_retries: 0,
        })
        .unwrap();
        let weather = OpenWeatherMapClient::new(&WeatherConfig {
            api_key: Some("owm-key".to_string()),
            base_url: url,
            timeout_seconds: 5,
            max_retries: 0,
        })
        .unwrap();

        let planner = TripPlanner::new(
            Arc::new(routes) as Arc<dyn RouteProvider>,
            Arc::new(narrative) as Arc<dyn NarrativeProvider>,
            Arc::new(weather) as Arc<dyn WeatherProvider>,
            Duration::from_secs(10),
        );

        let dir = tempfile::tempdir().unwrap();
        let store = TripStore::open(dir.path()).unwrap();
        let router = web::app(&ServerConfig::default(), AppState::new(planner, store)).unwrap();

        Self {
            router,
            _server: server,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

fn generate_request(body: Value) -> Request<Body> {
    Request::post("/api/generate-trip")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn trip_body(travelers: i64) -> Value {
    json!({
        "initial_destination": "Bengaluru Urban",
        "final_destination": "Mysuru (Mysore)",
        "start_date": "2026-03-01",
        "end_date": "2026-03-03",
        "num_travelers": travelers,
        "mood": "historical"
    })
}

#[tokio::test]
async fn test_generate_save_and_fetch_trip() {
    let app = TestApp::new(200).await;

    let (status, body) = app.send(generate_request(trip_body(2))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Trip generated successfully");

    let details = body["tripdetails"].as_str().unwrap();
    assert!(details.starts_with("# Trip to Mysuru (Mysore)"));
    assert!(details.contains(
        "**Route:** Bengaluru Urban → Mysuru (Mysore) | **Distance:** 145.3 km | **Travelers:** 2"
    ));
    assert!(details.contains("| 🚌 Bus | 4h 12m | 217.95 | 435.90 |"));
    assert!(details.contains("**Weather Forecast for Mysore, IN**"));
    assert_eq!(body["costs"]["train_cost_total"], 203.42);

    let id = body["tripid"].as_str().unwrap().to_string();
    let (status, saved) = app
        .send(
            Request::get(format!("/api/saved-trips/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["details"], details);

    let (_, list) = app
        .send(Request::get("/api/saved-trips").body(Body::empty()).unwrap())
        .await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(
            Request::delete(format!("/api/saved-trips/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Request::get(format!("/api/saved-trips/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_travelers_rejected() {
    let app = TestApp::new(200).await;

    let (status, body) = app.send(generate_request(trip_body(0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("num_travelers"));

    let (_, list) = app
        .send(Request::get("/api/saved-trips").body(Body::empty()).unwrap())
        .await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_narrative_failure_is_internal_error() {
    let app = TestApp::new(500).await;

    let (status, body) = app.send(generate_request(trip_body(2))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Error generating trip"));
}

#[tokio::test]
async fn test_weather_endpoint() {
    let app = TestApp::new(200).await;

    let (status, body) = app
        .send(
            Request::get("/api/weather/Mysore")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Mysore");
    assert_eq!(body["forecasts"][0]["description"], "clear sky");
    assert!(body.get("error_msg").is_none());
}

#[tokio::test]
async fn test_travel_costs_endpoint() {
    let app = TestApp::new(200).await;

    let (status, body) = app
        .send(
            Request::get("/api/travel-costs?from=Bengaluru%20Urban&to=Mysore&travelers=4")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distance_km"], 145.3);
    assert_eq!(body["num_travelers"], 4);
    assert_eq!(body["car_duration_label"], "3h 30m");
}
