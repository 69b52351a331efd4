//! Data models for the trip planner
//!
//! - Location: geographic coordinates
//! - Trip: incoming trip requests and their validated form
//! - Weather: daily forecast samples served to clients

pub mod location;
pub mod trip;
pub mod weather;

pub use location::Coordinates;
pub use trip::{Mood, TripPlan, TripRequest, Travelers};
pub use weather::{DailyForecast, WeatherReport};
