//! Per-mode travel cost and duration estimates
//!
//! All money amounts are in Indian rupees.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distance::DistanceResult;
use crate::models::Travelers;

/// Bus fare per person per km
pub const BUS_RATE_PER_KM: f64 = 1.5;
/// Train fare per person per km
pub const TRAIN_RATE_PER_KM: f64 = 0.7;
/// Fuel efficiency assumed for the group's car
pub const CAR_KM_PER_LITRE: f64 = 12.0;
pub const FUEL_PRICE_PER_LITRE: f64 = 110.0;
/// Buses are about 20% slower than driving
pub const BUS_DURATION_FACTOR: f64 = 1.2;
/// Trains are about 10% faster than driving
pub const TRAIN_DURATION_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Bus,
    Train,
}

impl TransportMode {
    /// Table order
    pub const ALL: [TransportMode; 3] = [TransportMode::Car, TransportMode::Bus, TransportMode::Train];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Car => "🚗 Car",
            TransportMode::Bus => "🚌 Bus",
            TransportMode::Train => "🚆 Train",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cost and duration estimate for one trip leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelCostEstimate {
    /// Rounded to one decimal
    pub distance_km: f64,
    pub num_travelers: u32,
    /// Group totals, rounded to two decimals
    pub bus_cost_total: f64,
    pub train_cost_total: f64,
    pub car_cost_total: f64,
    pub bus_duration_label: String,
    pub train_duration_label: String,
    pub car_duration_label: String,
}

impl TravelCostEstimate {
    #[must_use]
    pub fn total(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Car => self.car_cost_total,
            TransportMode::Bus => self.bus_cost_total,
            TransportMode::Train => self.train_cost_total,
        }
    }

    /// Display share of the group total; the car is one vehicle for everyone
    #[must_use]
    pub fn per_person(&self, mode: TransportMode) -> f64 {
        round_to(self.total(mode) / f64::from(self.num_travelers.max(1)), 2)
    }

    #[must_use]
    pub fn duration_label(&self, mode: TransportMode) -> &str {
        match mode {
            TransportMode::Car => &self.car_duration_label,
            TransportMode::Bus => &self.bus_duration_label,
            TransportMode::Train => &self.train_duration_label,
        }
    }
}

/// Price a leg for a validated party size
#[must_use]
pub fn compute_costs(distance: &DistanceResult, travelers: Travelers) -> TravelCostEstimate {
    let km = distance.distance_km;
    let people = travelers.as_f64();

    let bus_total = km * BUS_RATE_PER_KM * people;
    let train_total = km * TRAIN_RATE_PER_KM * people;
    let car_total = (km / CAR_KM_PER_LITRE) * FUEL_PRICE_PER_LITRE;

    let hours = distance.duration_hours;

    TravelCostEstimate {
        distance_km: distance.display_distance_km(),
        num_travelers: travelers.get(),
        bus_cost_total: round_to(bus_total, 2),
        train_cost_total: round_to(train_total, 2),
        car_cost_total: round_to(car_total, 2),
        bus_duration_label: format_duration(hours * BUS_DURATION_FACTOR),
        train_duration_label: format_duration(hours * TRAIN_DURATION_FACTOR),
        car_duration_label: format_duration(hours),
    }
}

#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// "30 mins", "2h 15m", "3h". Whole hours and minutes are truncated, not
/// rounded.
#[must_use]
pub fn format_duration(hours: f64) -> String {
    let hours = hours.max(0.0);
    if hours < 1.0 {
        return format!("{:.0} mins", hours * 60.0);
    }
    let whole = hours.trunc();
    let minutes = ((hours - whole) * 60.0).trunc() as u64;
    let whole = whole as u64;
    if minutes > 0 {
        format!("{whole}h {minutes}m")
    } else {
        format!("{whole}h")
    }
}
