//! Distance Resolver
//!
//! Turns two district names into a driving distance and duration. The
//! routing collaborator is asked first; when it fails the great-circle
//! distance is stretched by a road factor. Unknown names fall back to a
//! fixed default. [`DistanceResolver::resolve`] never returns an error.

use std::time::Duration;

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::gazetteer;
use crate::models::Coordinates;
use crate::routing::RouteProvider;

/// Straight-line to road distance multiplier
pub const ROAD_FACTOR: f64 = 1.3;
/// Average road speed assumed for the fallback estimate, km/h
pub const FALLBACK_SPEED_KMH: f64 = 60.0;
/// Distance used when either endpoint is not in the gazetteer
pub const DEFAULT_DISTANCE_KM: f64 = 500.0;

/// Driving distance and duration between two places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub distance_km: f64,
    pub duration_hours: f64,
}

impl DistanceResult {
    /// Clamp negatives (and NaN) coming from a collaborator to zero
    #[must_use]
    pub fn new(distance_km: f64, duration_hours: f64) -> Self {
        Self {
            distance_km: non_negative(distance_km),
            duration_hours: non_negative(duration_hours),
        }
    }

    /// Estimate derived from a road distance at the assumed average speed
    #[must_use]
    pub fn from_road_distance(distance_km: f64) -> Self {
        Self::new(distance_km, distance_km / FALLBACK_SPEED_KMH)
    }

    /// Estimate for places outside the gazetteer: a 500 km drive at the
    /// fallback speed, priced like any other distance
    #[must_use]
    pub fn default_estimate() -> Self {
        Self::from_road_distance(DEFAULT_DISTANCE_KM)
    }

    /// Distance for display, one decimal
    #[must_use]
    pub fn display_distance_km(&self) -> f64 {
        (self.distance_km * 10.0).round() / 10.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Great-circle distance in kilometres
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.latitude,
            longitude: from.longitude,
        },
        HaversineLocation {
            latitude: to.latitude,
            longitude: to.longitude,
        },
        Units::Kilometers,
    )
}

/// Road estimate used when no route is available
#[must_use]
pub fn estimate_by_road_factor(from: Coordinates, to: Coordinates) -> DistanceResult {
    DistanceResult::from_road_distance(haversine_km(from, to) * ROAD_FACTOR)
}

pub struct DistanceResolver<R> {
    routes: R,
    timeout: Duration,
}

impl<R: RouteProvider> DistanceResolver<R> {
    pub fn new(routes: R, timeout: Duration) -> Self {
        Self { routes, timeout }
    }

    /// Resolve the driving distance between two named places
    #[instrument(skip(self))]
    pub async fn resolve(&self, origin: &str, destination: &str) -> DistanceResult {
        let (Some(from), Some(to)) = (gazetteer::lookup(origin), gazetteer::lookup(destination))
        else {
            warn!(
                "Coordinates not found for: {} or {}, using default estimate",
                origin, destination
            );
            return DistanceResult::default_estimate();
        };

        match tokio::time::timeout(self.timeout, self.routes.route(from, to)).await {
            Ok(Ok(route)) => {
                debug!(
                    "Routed {} -> {}: {:.1} km, {:.2} h",
                    origin,
                    destination,
                    route.distance_km(),
                    route.duration_hours()
                );
                DistanceResult::new(route.distance_km(), route.duration_hours())
            }
            Ok(Err(e)) => {
                warn!("Routing error: {}, falling back to estimation", e);
                estimate_by_road_factor(from, to)
            }
            Err(_) => {
                warn!(
                    "Routing timed out after {:?}, falling back to estimation",
                    self.timeout
                );
                estimate_by_road_factor(from, to)
            }
        }
    }
}
