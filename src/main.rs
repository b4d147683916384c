use dotenv::dotenv;
use std::env;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pointbridge::{
    config::settings::{Config, LoggingConfig},
    error::{GatewayError, Result},
    services::CitySearchService,
    DatabaseBuilder,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load();
    init_tracing(&config.logging)?;

    info!(
        "🚀 Starting {} v{} ({} backend)",
        pointbridge::NAME,
        pointbridge::VERSION,
        config.backend
    );

    let db = DatabaseBuilder::new().with_config(config.clone()).build()?;

    let report = db.health_check().await;
    if report.status.is_usable() {
        info!("✅ Backend {} is {:?}: {}", report.backend, report.status, report.details);
    } else {
        error!("❌ Backend {} is unreachable: {}", report.backend, report.details);
    }

    // Optional city lookup: `pointbridge <query>`
    if let Some(query) = env::args().nth(1) {
        let cities = CitySearchService::from_config(&config.cities, &db)
            .search(&query)
            .await;
        if cities.is_empty() {
            warn!("No cities found for {:?}", query);
        }
        println!("{}", serde_json::to_string_pretty(&cities)?);
    }

    if report.status.is_usable() {
        Ok(())
    } else {
        Err(GatewayError::ExternalService(format!(
            "{} backend health check failed",
            report.backend
        )))
    }
}

/// Initialize structured logging
#[instrument(skip(logging))]
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let default_filter = format!("pointbridge={0},{0}", logging.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter));

    let json = logging.is_json();
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .compact()
        }))
        // JSON logging for production
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
        }))
        .try_init()
        .map_err(|e| GatewayError::internal(format!("Failed to initialize logging: {}", e)))?;

    info!("✅ Structured logging initialized with level: {}", logging.level);
    Ok(())
}
