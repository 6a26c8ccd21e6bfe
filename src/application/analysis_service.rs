// Analysis service - Use case for analysing one sensor window
use crate::application::analytics::{AnalysisEngine, AnalysisRequest};
use crate::application::error::ServiceError;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::analysis::{AnalysisReport, TrendModel};
use crate::domain::range::Lookback;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisQuery {
    pub sensor: String,
    pub secondary: Option<String>,
    pub range: Lookback,
    pub aggregate_window: Option<Lookback>,
    pub model: TrendModel,
    pub change_threshold_percent: Option<f64>,
    pub smoothing_alpha: Option<f64>,
    pub smoothing_beta: Option<f64>,
}

impl AnalysisQuery {
    pub fn new(sensor: impl Into<String>, range: Lookback) -> Self {
        Self {
            sensor: sensor.into(),
            secondary: None,
            range,
            aggregate_window: None,
            model: TrendModel::default(),
            change_threshold_percent: None,
            smoothing_alpha: None,
            smoothing_beta: None,
        }
    }
}

#[derive(Clone)]
pub struct AnalysisService {
    repository: Arc<dyn TelemetryRepository>,
    engine: AnalysisEngine,
}

impl AnalysisService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, engine: AnalysisEngine) -> Self {
        Self { repository, engine }
    }

    pub async fn analyze(&self, query: AnalysisQuery) -> Result<AnalysisReport, ServiceError> {
        // Unknown sensors are rejected before touching the store
        self.engine.catalog().get(&query.sensor)?;
        if let Some(secondary) = &query.secondary {
            self.engine.catalog().get(secondary)?;
        }

        let aggregate_window = query.aggregate_window.as_ref();
        let primary = self
            .repository
            .query_series(&query.sensor, &query.range, aggregate_window);
        let secondary = async {
            match &query.secondary {
                Some(key) => self
                    .repository
                    .query_series(key, &query.range, aggregate_window)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (primary, secondary) = tokio::try_join!(primary, secondary)?;

        tracing::debug!(
            "Fetched {} samples for {} over {}",
            primary.len(),
            query.sensor,
            query.range
        );

        let request = AnalysisRequest {
            primary,
            secondary,
            trend_model: query.model,
            change_threshold_percent: query.change_threshold_percent,
            smoothing_alpha: query.smoothing_alpha,
            smoothing_beta: query.smoothing_beta,
        };

        self.engine.analyze(&request).map_err(|e| {
            tracing::warn!("Rejected analysis request for {}: {}", query.sensor, e);
            ServiceError::from(e)
        })
    }
}
