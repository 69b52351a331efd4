//! Trip request model and validation

use std::fmt;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TripPlannerError;

/// Largest party the planner accepts in one request
pub const MAX_TRAVELERS: u32 = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trip generation request as posted by the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub initial_destination: String,
    pub final_destination: String,
    /// ISO date, e.g. "2026-03-01"
    pub start_date: String,
    pub end_date: String,
    /// Signed so that zero and negative counts reach validation
    pub num_travelers: i64,
    #[serde(default)]
    pub mood: Mood,
}

/// Travel style the itinerary should focus on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Cultural,
    NaturalBeauty,
    Historical,
    Adventure,
    Relaxation,
    #[default]
    #[serde(other)]
    General,
}

impl Mood {
    /// Activities handed to the narrative prompt
    #[must_use]
    pub fn activities(self) -> &'static str {
        match self {
            Mood::Cultural => {
                "cultural exploration, museums, temples, local traditions, art galleries"
            }
            Mood::NaturalBeauty => {
                "nature exploration, scenic viewpoints, parks, gardens, natural landscapes"
            }
            Mood::Historical => {
                "historical monuments, heritage sites, forts, palaces, ancient architecture"
            }
            Mood::Adventure => {
                "adventure activities, trekking, outdoor sports, thrilling experiences"
            }
            Mood::Relaxation => {
                "relaxation, spa, peaceful locations, wellness, serene environments"
            }
            Mood::General => "diverse tourist attractions and local experiences",
        }
    }
}

/// Validated, strictly positive traveler count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Travelers(NonZeroU32);

impl Travelers {
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0.get())
    }

    /// How the party is described to the narrative collaborator
    #[must_use]
    pub fn companions(self) -> String {
        match self.get() {
            1 => "solo".to_string(),
            2 => "couple".to_string(),
            n if n <= 5 => format!("group of {n}"),
            n => format!("large group of {n}"),
        }
    }
}

impl TryFrom<i64> for Travelers {
    type Error = TripPlannerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let count = u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                TripPlannerError::validation(format!(
                    "num_travelers must be a positive integer, got {value}"
                ))
            })?;
        if count.get() > MAX_TRAVELERS {
            return Err(TripPlannerError::validation(format!(
                "num_travelers cannot exceed {MAX_TRAVELERS}"
            )));
        }
        Ok(Self(count))
    }
}

impl From<Travelers> for u32 {
    fn from(value: Travelers) -> Self {
        value.get()
    }
}

impl fmt::Display for Travelers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A trip request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: Travelers,
    pub mood: Mood,
}

impl TripPlan {
    /// Trip length in days, both ends inclusive
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

impl TripRequest {
    /// Check the request and convert it into a [`TripPlan`]
    pub fn validate(&self) -> crate::Result<TripPlan> {
        let origin = self.initial_destination.trim();
        let destination = self.final_destination.trim();
        if origin.is_empty() {
            return Err(TripPlannerError::validation(
                "initial_destination cannot be empty",
            ));
        }
        if destination.is_empty() {
            return Err(TripPlannerError::validation(
                "final_destination cannot be empty",
            ));
        }

        let start_date = parse_date("start_date", &self.start_date)?;
        let end_date = parse_date("end_date", &self.end_date)?;
        if end_date < start_date {
            return Err(TripPlannerError::validation(
                "end_date must not be before start_date",
            ));
        }

        Ok(TripPlan {
            origin: origin.to_string(),
            destination: destination.to_string(),
            start_date,
            end_date,
            travelers: Travelers::try_from(self.num_travelers)?,
            mood: self.mood,
        })
    }
}

fn parse_date(field: &str, value: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        TripPlannerError::validation(format!("{field} must be a date in YYYY-MM-DD format"))
    })
}
