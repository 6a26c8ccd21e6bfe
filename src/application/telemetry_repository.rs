// Repository trait for telemetry data access
use crate::domain::range::Lookback;
use crate::domain::telemetry::{HistoryRow, Series, Snapshot};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Query the window of one sensor field over `range`, optionally averaged
    /// into `aggregate_window` buckets. Samples come back ordered by time and
    /// missing values stay `None`.
    async fn query_series(
        &self,
        sensor_key: &str,
        range: &Lookback,
        aggregate_window: Option<&Lookback>,
    ) -> anyhow::Result<Series>;

    /// Query the most recent value of each sensor field, pivoted into one row
    async fn query_latest(&self, sensor_keys: &[String]) -> anyhow::Result<Snapshot>;

    /// Query the last `limit` rows of the given fields within `range`, one
    /// row per timestamp, oldest first.
    async fn query_history(
        &self,
        sensor_keys: &[String],
        range: &Lookback,
        limit: usize,
    ) -> anyhow::Result<Vec<HistoryRow>>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;

    /// Serves canned windows; keys listed in `failing` return an error.
    #[derive(Default)]
    pub struct InMemoryRepository {
        pub series: HashMap<String, Series>,
        pub latest: Snapshot,
        pub history: Vec<HistoryRow>,
        pub failing: Vec<String>,
    }

    impl InMemoryRepository {
        pub fn with_series(mut self, series: Series) -> Self {
            self.series.insert(series.sensor_key.clone(), series);
            self
        }
    }

    #[async_trait]
    impl TelemetryRepository for InMemoryRepository {
        async fn query_series(
            &self,
            sensor_key: &str,
            _range: &Lookback,
            _aggregate_window: Option<&Lookback>,
        ) -> anyhow::Result<Series> {
            if self.failing.iter().any(|k| k == sensor_key) {
                anyhow::bail!("store unavailable for {}", sensor_key);
            }
            Ok(self
                .series
                .get(sensor_key)
                .cloned()
                .unwrap_or_else(|| Series::empty(sensor_key)))
        }

        async fn query_latest(&self, _sensor_keys: &[String]) -> anyhow::Result<Snapshot> {
            if !self.failing.is_empty() {
                anyhow::bail!("store unavailable");
            }
            Ok(self.latest.clone())
        }

        async fn query_history(
            &self,
            sensor_keys: &[String],
            _range: &Lookback,
            limit: usize,
        ) -> anyhow::Result<Vec<HistoryRow>> {
            if !self.failing.is_empty() {
                anyhow::bail!("store unavailable");
            }
            let skip = self.history.len().saturating_sub(limit);
            Ok(self
                .history
                .iter()
                .skip(skip)
                .map(|row| HistoryRow {
                    timestamp: row.timestamp,
                    values: row
                        .values
                        .iter()
                        .filter(|(key, _)| sensor_keys.contains(key))
                        .map(|(key, value)| (key.clone(), *value))
                        .collect(),
                })
                .collect())
        }
    }
}
