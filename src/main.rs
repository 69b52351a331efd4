use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use trip_planner::config::PlannerConfig;
use trip_planner::{
    AppState, CachedRouteProvider, GroqClient, NarrativeProvider, OpenRouteServiceClient,
    OpenWeatherMapClient, PersistentCache, RouteProvider, TripPlanner, TripStore, WeatherProvider,
    logging, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlannerConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;
    info!("Starting trip-planner {}", trip_planner::VERSION);

    let data_dir = Path::new(&config.storage.data_dir);

    let ors = OpenRouteServiceClient::new(&config.routing)?;
    let routes: Arc<dyn RouteProvider> = if config.routing.cache_ttl_hours > 0 {
        let cache = PersistentCache::open(data_dir.join("cache"))
            .context("Failed to open route cache")?;
        let ttl = Duration::from_secs(u64::from(config.routing.cache_ttl_hours) * 3600);
        info!("Route cache enabled, ttl {}h", config.routing.cache_ttl_hours);
        Arc::new(CachedRouteProvider::new(ors, cache, ttl))
    } else {
        Arc::new(ors)
    };
    let narrative: Arc<dyn NarrativeProvider> = Arc::new(GroqClient::new(&config.narrative)?);
    let weather: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherMapClient::new(&config.weather)?);

    let planner = TripPlanner::new(
        routes,
        narrative,
        weather,
        Duration::from_secs(config.planner.collaborator_timeout_seconds.into()),
    );
    let store = TripStore::open(data_dir.join("trips"))?;

    web::run(&config.server, AppState::new(planner, store)).await
}
