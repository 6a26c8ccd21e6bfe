// Presentation layer - HTTP routes and handlers
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    analyze_sensor, health_check, latest_status, list_sensors, sensor_history, stream_overview,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/sensors", get(list_sensors))
        .route("/sensors/latest", get(latest_status))
        .route("/history", get(sensor_history))
        .route("/analysis/:sensor", get(analyze_sensor))
        .route("/overview", get(stream_overview))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
