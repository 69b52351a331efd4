//! Trip document assembly
//!
//! [`TripPlanner`] runs one request end to end: the distance lookup feeds the
//! narrative prompt while the weather forecast is fetched alongside, then
//! [`augment`] appends the priced travel table and the weather section to
//! the generated narrative.

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::distance::{DistanceResolver, DistanceResult};
use crate::models::{TripRequest, Travelers, WeatherReport};
use crate::narrative::NarrativeProvider;
use crate::pricing::{TransportMode, TravelCostEstimate, compute_costs};
use crate::prompt::{TripContext, distance_line, system_prompt, user_prompt};
use crate::routing::RouteProvider;
use crate::weather::{WeatherProvider, format_weather_block, weather_unavailable_notice};
use crate::{Result, TripPlannerError};

/// Message served by the weather endpoint when no forecast could be fetched
pub const WEATHER_UNAVAILABLE: &str = "Weather data not available";

/// Endpoints of the trip as the traveler named them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub origin: String,
    pub destination: String,
}

/// A finished trip document together with the numbers used in it
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTrip {
    pub document: String,
    pub costs: TravelCostEstimate,
}

/// Append the expense table and weather section to a narrative.
/// The narrative itself is never altered.
#[must_use]
pub fn augment(
    narrative: &str,
    route: &RouteSummary,
    costs: &TravelCostEstimate,
    weather_block: &str,
) -> String {
    let mut out = String::with_capacity(narrative.len() + weather_block.len() + 1024);
    out.push_str(narrative);

    out.push_str("\n\n---\n\n## Travel Expenses\n\n");
    let _ = writeln!(
        out,
        "**Route:** {} → {} | **Distance:** {:.1} km | **Travelers:** {}\n",
        route.origin, route.destination, costs.distance_km, costs.num_travelers
    );
    out.push_str("| Transport | Duration | Cost/Person (₹) | Total Cost (₹) |\n");
    out.push_str("|-----------|----------|-----------------|----------------|\n");
    for mode in TransportMode::ALL {
        let _ = writeln!(
            out,
            "| {} | {} | {:.2} | {:.2} |",
            mode,
            costs.duration_label(mode),
            costs.per_person(mode),
            costs.total(mode)
        );
    }
    out.push_str(
        "\n**💡 Recommendation:** Train offers the best balance of cost and comfort for this journey.\n",
    );

    out.push_str("\n---\n\n## Weather Information\n\n");
    out.push_str(weather_block);
    out.push_str(
        "\n**Packing Recommendations:**\nBased on the weather forecast above, make sure to pack appropriate clothing and gear. Check the weather closer to your travel dates for the most accurate information.\n",
    );
    out
}

pub struct TripPlanner<R, N, W> {
    distances: DistanceResolver<R>,
    narrative: N,
    weather: W,
    timeout: Duration,
}

impl<R, N, W> TripPlanner<R, N, W>
where
    R: RouteProvider,
    N: NarrativeProvider,
    W: WeatherProvider,
{
    /// `timeout` bounds every single collaborator call
    pub fn new(routes: R, narrative: N, weather: W, timeout: Duration) -> Self {
        Self {
            distances: DistanceResolver::new(routes, timeout),
            narrative,
            weather,
            timeout,
        }
    }

    /// Validate a request and produce the complete trip document
    #[instrument(skip_all, fields(from = %request.initial_destination, to = %request.final_destination))]
    pub async fn generate_trip_document(&self, request: &TripRequest) -> Result<GeneratedTrip> {
        let plan = request.validate()?;
        let ctx = TripContext::from(&plan);

        let narrative_flow = async {
            let distance = self.distances.resolve(&plan.origin, &plan.destination).await;
            let line = distance_line(&plan.origin, &plan.destination, &distance);
            let narrative = self
                .generate_narrative(&system_prompt(&ctx), &user_prompt(&ctx, &line))
                .await?;
            Ok::<(DistanceResult, String), TripPlannerError>((distance, narrative))
        };
        let weather_flow = async {
            match self.fetch_weather(&plan.destination).await {
                Ok(report) => format_weather_block(&report),
                Err(e) => {
                    warn!("Weather lookup failed for {}: {}", plan.destination, e);
                    weather_unavailable_notice(&plan.destination)
                }
            }
        };

        let (narrative, weather_block) = tokio::join!(narrative_flow, weather_flow);
        let (distance, narrative) = narrative?;

        let costs = compute_costs(&distance, plan.travelers);
        let route = RouteSummary {
            origin: plan.origin.clone(),
            destination: plan.destination.clone(),
        };
        let document = augment(&narrative, &route, &costs, &weather_block);

        info!(
            "Generated {}-day trip document ({} chars)",
            ctx.duration_days,
            document.len()
        );
        Ok(GeneratedTrip { document, costs })
    }

    /// Price a leg without generating a narrative
    pub async fn estimate_costs(
        &self,
        origin: &str,
        destination: &str,
        travelers: Travelers,
    ) -> TravelCostEstimate {
        let distance = self.distances.resolve(origin, destination).await;
        compute_costs(&distance, travelers)
    }

    /// Forecast for a place; failures become a report carrying only an error message
    pub async fn weather_report(&self, place: &str) -> WeatherReport {
        match self.fetch_weather(place).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Weather lookup failed for {}: {}", place, e);
                WeatherReport::unavailable(WEATHER_UNAVAILABLE)
            }
        }
    }

    async fn generate_narrative(&self, system: &str, user: &str) -> Result<String> {
        tokio::time::timeout(self.timeout, self.narrative.complete(system, user))
            .await
            .map_err(|_| {
                TripPlannerError::api(format!(
                    "narrative generation timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
    }

    async fn fetch_weather(&self, place: &str) -> Result<WeatherReport> {
        tokio::time::timeout(self.timeout, self.weather.forecast(place))
            .await
            .map_err(|_| {
                TripPlannerError::api(format!(
                    "weather lookup timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, DailyForecast, Mood};
    use crate::pricing::{BUS_DURATION_FACTOR, format_duration};
    use crate::routing::Route;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRoutes;

    #[async_trait]
    impl RouteProvider for StubRoutes {
        async fn route(&self, _from: Coordinates, _to: Coordinates) -> Result<Route> {
            Ok(Route {
                distance_meters: 100_000.0,
                duration_seconds: 7_200.0,
            })
        }
    }

    #[derive(Default)]
    struct RecordingNarrative {
        calls: AtomicUsize,
        last_user_prompt: Mutex<String>,
        fail: bool,
    }

    #[async_trait]
    impl NarrativeProvider for RecordingNarrative {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_user_prompt.lock() {
                *last = user.to_string();
            }
            if self.fail {
                Err(TripPlannerError::api("groq API error: overloaded"))
            } else {
                Ok("# Trip to Mysuru (Mysore)\n\n## Day 1".to_string())
            }
        }
    }

    struct StubWeather(Option<WeatherReport>);

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn forecast(&self, _place: &str) -> Result<WeatherReport> {
            self.0
                .clone()
                .ok_or_else(|| TripPlannerError::api("weather API error (404)"))
        }
    }

    struct StalledWeather;

    #[async_trait]
    impl WeatherProvider for StalledWeather {
        async fn forecast(&self, _place: &str) -> Result<WeatherReport> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(TripPlannerError::api("unreachable"))
        }
    }

    fn sunny_report() -> WeatherReport {
        WeatherReport {
            city: "Mysore".to_string(),
            country: "IN".to_string(),
            forecasts: vec![DailyForecast {
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                temp: 30.2,
                feels_like: 31.0,
                temp_min: 24.0,
                temp_max: 32.5,
                humidity: 40,
                description: "clear sky".to_string(),
                icon: "01d".to_string(),
                wind_speed: 2.5,
                rain_chance: 0.0,
            }],
            error_msg: None,
        }
    }

    fn request(travelers: i64) -> TripRequest {
        TripRequest {
            initial_destination: "Bengaluru Urban".to_string(),
            final_destination: "Mysuru (Mysore)".to_string(),
            start_date: "2026-03-01".to_string(),
            end_date: "2026-03-03".to_string(),
            num_travelers: travelers,
            mood: Mood::Historical,
        }
    }

    fn planner<W: WeatherProvider>(
        narrative: RecordingNarrative,
        weather: W,
    ) -> TripPlanner<StubRoutes, RecordingNarrative, W> {
        TripPlanner::new(StubRoutes, narrative, weather, Duration::from_secs(30))
    }

    fn sample_costs() -> TravelCostEstimate {
        compute_costs(
            &DistanceResult::new(100.0, 2.0),
            Travelers::try_from(4).unwrap(),
        )
    }

    #[test]
    fn test_augment_section_order() {
        let route = RouteSummary {
            origin: "Bengaluru Urban".to_string(),
            destination: "Mysuru (Mysore)".to_string(),
        };
        let doc = augment("NARRATIVE", &route, &sample_costs(), "WEATHER");

        assert!(doc.starts_with("NARRATIVE\n\n---\n\n## Travel Expenses"));
        let expenses = doc.find("## Travel Expenses").unwrap();
        let weather = doc.find("## Weather Information").unwrap();
        let block = doc.find("WEATHER\n").unwrap();
        assert!(expenses < weather && weather < block);
        assert!(doc.contains(
            "**Route:** Bengaluru Urban → Mysuru (Mysore) | **Distance:** 100.0 km | **Travelers:** 4"
        ));
    }

    #[test]
    fn test_augment_table_rows() {
        let route = RouteSummary {
            origin: "A".to_string(),
            destination: "B".to_string(),
        };
        let doc = augment("", &route, &sample_costs(), "");

        assert!(doc.contains("| 🚗 Car | 2h | 229.17 | 916.67 |"));
        assert!(doc.contains(&format!(
            "| 🚌 Bus | {} | 150.00 | 600.00 |",
            format_duration(2.0 * BUS_DURATION_FACTOR)
        )));
        assert!(doc.contains("| 🚆 Train | 1h 48m | 70.00 | 280.00 |"));
        let car = doc.find("🚗 Car").unwrap();
        let bus = doc.find("🚌 Bus").unwrap();
        let train = doc.find("🚆 Train").unwrap();
        assert!(car < bus && bus < train);
        assert!(doc.contains("Train offers the best balance of cost and comfort"));
    }

    #[tokio::test]
    async fn test_generate_trip_document() {
        let planner = planner(RecordingNarrative::default(), StubWeather(Some(sunny_report())));
        let trip = planner.generate_trip_document(&request(4)).await.unwrap();

        assert!(trip.document.starts_with("# Trip to Mysuru (Mysore)\n\n## Day 1\n\n---"));
        assert!(trip.document.contains("**Weather Forecast for Mysore, IN**"));
        assert_eq!(trip.costs.bus_cost_total, 600.0);
        assert_eq!(trip.costs.car_duration_label, "2h");

        let prompt = planner.narrative.last_user_prompt.lock().unwrap().clone();
        assert!(prompt.contains("Distance between Bengaluru Urban and Mysuru (Mysore): 100.00 km"));
        assert!(prompt.contains("3-day trip itinerary"));
    }

    #[tokio::test]
    async fn test_weather_failure_degrades_to_notice() {
        let planner = planner(RecordingNarrative::default(), StubWeather(None));
        let trip = planner.generate_trip_document(&request(2)).await.unwrap();

        assert!(trip.document.contains("⚠️ Weather information not available for Mysuru (Mysore)"));
        assert!(trip.document.contains("## Travel Expenses"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_weather_times_out() {
        let planner = planner(RecordingNarrative::default(), StalledWeather);
        let trip = planner.generate_trip_document(&request(2)).await.unwrap();
        assert!(trip.document.contains("Weather information not available"));
    }

    #[tokio::test]
    async fn test_narrative_failure_is_fatal() {
        let narrative = RecordingNarrative {
            fail: true,
            ..Default::default()
        };
        let planner = planner(narrative, StubWeather(Some(sunny_report())));
        let err = planner.generate_trip_document(&request(2)).await.unwrap_err();
        assert!(matches!(err, TripPlannerError::Api { .. }));
    }

    #[tokio::test]
    async fn test_invalid_request_skips_collaborators() {
        let planner = planner(RecordingNarrative::default(), StubWeather(Some(sunny_report())));
        let err = planner.generate_trip_document(&request(0)).await.unwrap_err();

        assert!(matches!(err, TripPlannerError::Validation { .. }));
        assert_eq!(planner.narrative.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_weather_report_failure() {
        let planner = planner(RecordingNarrative::default(), StubWeather(None));
        let report = planner.weather_report("Udupi").await;
        assert_eq!(report.error_msg.as_deref(), Some(WEATHER_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_estimate_costs_for_unknown_place() {
        let planner = planner(RecordingNarrative::default(), StubWeather(None));
        let costs = planner
            .estimate_costs("Atlantis", "Udupi", Travelers::try_from(2).unwrap())
            .await;
        assert_eq!(costs.distance_km, 500.0);
        assert_eq!(costs.train_cost_total, 700.0);
    }
}
