// HTTP request handlers
use crate::application::analysis_service::AnalysisQuery;
use crate::application::error::ServiceError;
use crate::domain::error::AnalysisError;
use crate::domain::range::Lookback;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_ANALYSIS_RANGE: &str = "7d";
const DEFAULT_OVERVIEW_RANGE: &str = "1d";
const DEFAULT_HISTORY_RANGE: &str = "10d";
const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisParams {
    pub range: Option<String>,
    pub aggregate_window: Option<String>,
    pub secondary: Option<String>,
    pub model: Option<String>,
    pub change_threshold: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub range: Option<String>,
    pub limit: Option<usize>,
    pub sensor: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AnalysisParams {
    pub fn into_query(self, sensor: String) -> Result<AnalysisQuery, AnalysisError> {
        let range: Lookback = self
            .range
            .as_deref()
            .unwrap_or(DEFAULT_ANALYSIS_RANGE)
            .parse()?;
        let mut query = AnalysisQuery::new(sensor, range);

        query.aggregate_window = self
            .aggregate_window
            .as_deref()
            .map(str::parse::<Lookback>)
            .transpose()?;
        query.secondary = self.secondary.filter(|s| !s.is_empty());
        if let Some(model) = self.model.as_deref() {
            query.model = model.parse()?;
        }
        query.change_threshold_percent = self.change_threshold;
        query.smoothing_alpha = self.alpha;
        query.smoothing_beta = self.beta;

        Ok(query)
    }
}

pub fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Analysis(AnalysisError::UnknownSensor(_)) => StatusCode::NOT_FOUND,
        ServiceError::Analysis(AnalysisError::InvalidCatalog(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ServiceError::Analysis(_) => StatusCode::BAD_REQUEST,
        ServiceError::Repository(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn error_response(error: ServiceError, compress: bool) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected: {}", error);
    }

    let body = ErrorBody {
        error: error.to_string(),
    };
    match json_response(status, &body, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn ok_response<T: Serialize>(data: &T, compress: bool) -> Response {
    match json_response(StatusCode::OK, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the configured sensor profiles
pub async fn list_sensors(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    ok_response(&state.sensor_service.profiles(), accepts_brotli(&headers)).await
}

/// Latest value and status of every sensor
pub async fn latest_status(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);
    match state.sensor_service.latest_status().await {
        Ok(status) => ok_response(&status, compress).await,
        Err(e) => error_response(e, compress).await,
    }
}

/// Raw pivoted rows, all sensors or one, oldest first
pub async fn sensor_history(
    Query(params): Query<HistoryParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let range: Lookback = match params
        .range
        .as_deref()
        .unwrap_or(DEFAULT_HISTORY_RANGE)
        .parse()
    {
        Ok(range) => range,
        Err(e) => return error_response(ServiceError::from(e), compress).await,
    };
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let sensor = params.sensor.as_deref().filter(|s| !s.is_empty());

    match state.sensor_service.history(range, limit, sensor).await {
        Ok(rows) => ok_response(&rows, compress).await,
        Err(e) => error_response(e, compress).await,
    }
}

/// Full trend and anomaly analysis of one sensor
pub async fn analyze_sensor(
    Path(sensor): Path<String>,
    Query(params): Query<AnalysisParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let query = match params.into_query(sensor) {
        Ok(query) => query,
        Err(e) => return error_response(e.into(), compress).await,
    };

    match state.analysis_service.analyze(query).await {
        Ok(report) => ok_response(&report, compress).await,
        Err(e) => error_response(e, compress).await,
    }
}

/// Stream per-sensor summary cards (progressive loading)
pub async fn stream_overview(
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let range: Lookback = match query
        .range
        .as_deref()
        .unwrap_or(DEFAULT_OVERVIEW_RANGE)
        .parse()
    {
        Ok(range) => range,
        Err(e) => return error_response(ServiceError::from(e), compress).await,
    };

    let rx = state.overview_service.stream_overview(range).await;
    stream_from_receiver(rx, compress).await.into_response()
}
