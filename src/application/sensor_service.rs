// Sensor service - Use cases for the sensor catalog and latest readings
use crate::application::analytics::threshold;
use crate::application::error::ServiceError;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::analysis::Classification;
use crate::domain::error::AnalysisError;
use crate::domain::range::Lookback;
use crate::domain::sensor::{SensorCatalog, SensorProfile};
use crate::domain::telemetry::HistoryRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStatus {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub value: Option<f64>,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestStatus {
    pub timestamp: Option<DateTime<Utc>>,
    pub sensors: Vec<SensorStatus>,
}

/// Upper bound on the rows one history request may ask for.
pub const MAX_HISTORY_LIMIT: usize = 10_000;

#[derive(Clone)]
pub struct SensorService {
    repository: Arc<dyn TelemetryRepository>,
    catalog: Arc<SensorCatalog>,
}

impl SensorService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, catalog: Arc<SensorCatalog>) -> Self {
        Self { repository, catalog }
    }

    pub fn profiles(&self) -> Vec<SensorProfile> {
        self.catalog.profiles().to_vec()
    }

    pub async fn latest_status(&self) -> Result<LatestStatus, ServiceError> {
        let snapshot = self.repository.query_latest(&self.catalog.keys()).await?;

        let sensors = self
            .catalog
            .profiles()
            .iter()
            .map(|profile| {
                let value = snapshot.value(&profile.key);
                SensorStatus {
                    key: profile.key.clone(),
                    label: profile.label.clone(),
                    unit: profile.unit.clone(),
                    value,
                    classification: threshold::classify(value, &profile.band(), &profile.unit),
                }
            })
            .collect();

        Ok(LatestStatus {
            timestamp: snapshot.timestamp,
            sensors,
        })
    }

    /// Raw rows of every catalog sensor, or of `sensor` alone, over `range`.
    pub async fn history(
        &self,
        range: Lookback,
        limit: usize,
        sensor: Option<&str>,
    ) -> Result<Vec<HistoryRow>, ServiceError> {
        if limit == 0 || limit > MAX_HISTORY_LIMIT {
            return Err(AnalysisError::InvalidParameter {
                name: "limit",
                reason: format!("must be within 1..={}, got {}", MAX_HISTORY_LIMIT, limit),
            }
            .into());
        }

        let keys = match sensor {
            Some(key) => vec![self.catalog.get(key)?.key.clone()],
            None => self.catalog.keys(),
        };

        let rows = self.repository.query_history(&keys, &range, limit).await?;
        tracing::debug!("History of {} sensors over {}: {} rows", keys.len(), range, rows.len());
        Ok(rows)
    }
}
