//! Trip planner backend
//!
//! Generates day-by-day itineraries for trips between Karnataka districts
//! and attaches a priced travel table (car, bus, train) and a weather
//! forecast to each generated document.

pub mod api;
pub mod cache;
pub mod config;
pub mod distance;
pub mod error;
pub mod gazetteer;
pub mod http;
pub mod itinerary;
pub mod logging;
pub mod models;
pub mod narrative;
pub mod pricing;
pub mod prompt;
pub mod routing;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, Planner};
pub use cache::PersistentCache;
pub use config::PlannerConfig;
pub use distance::{DistanceResolver, DistanceResult};
pub use error::TripPlannerError;
pub use itinerary::{GeneratedTrip, RouteSummary, TripPlanner, augment};
pub use models::{Coordinates, Mood, TripRequest, Travelers, WeatherReport};
pub use narrative::{GroqClient, NarrativeProvider};
pub use pricing::{TransportMode, TravelCostEstimate, compute_costs};
pub use routing::{CachedRouteProvider, OpenRouteServiceClient, Route, RouteProvider};
pub use store::{TripRecord, TripRepository, TripStore};
pub use weather::{OpenWeatherMapClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;
