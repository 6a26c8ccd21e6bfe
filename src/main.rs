// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hydro_telemetry::application::analysis_service::AnalysisService;
use hydro_telemetry::application::analytics::AnalysisEngine;
use hydro_telemetry::application::overview_service::OverviewService;
use hydro_telemetry::application::sensor_service::SensorService;
use hydro_telemetry::infrastructure::config::{load_app_config, load_sensor_catalog};
use hydro_telemetry::infrastructure::influx_repository::InfluxRepository;
use hydro_telemetry::presentation::app_state::AppState;
use hydro_telemetry::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hydro_telemetry=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config().context("Failed to load config/app")?;
    let catalog = Arc::new(load_sensor_catalog().context("Failed to load sensor profiles")?);
    tracing::info!("Loaded {} sensor profiles", catalog.profiles().len());

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(app_config.influx, app_config.queries));

    // Create services (application layer)
    let engine = AnalysisEngine::new(catalog.clone(), app_config.analysis);
    let state = Arc::new(AppState {
        sensor_service: SensorService::new(repository.clone(), catalog.clone()),
        analysis_service: AnalysisService::new(repository.clone(), engine),
        overview_service: OverviewService::new(repository.clone(), catalog),
    });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.bind_address))?;
    tracing::info!("Starting hydro-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
