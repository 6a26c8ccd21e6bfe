// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::range::Lookback;
use crate::domain::telemetry::{HistoryRow, Sample, Series, Snapshot};
use crate::infrastructure::config::{prepare_query, InfluxSettings, QueryTemplates};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    max_points: usize,
    queries: QueryTemplates,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(settings: InfluxSettings, queries: QueryTemplates) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            measurement: settings.measurement,
            max_points: settings.max_points.max(1),
            queries,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn query_vars(&self, field: &str, range: &Lookback) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("field".to_string(), field.to_string());
        vars.insert("measurement".to_string(), self.measurement.clone());
        vars.insert("range".to_string(), range.to_string());
        vars
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);
        tracing::debug!("Executing InfluxQL query: {}", query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

fn parse_time(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Collect `(time, value)` rows from every returned series. Rows without a
/// parsable time are dropped; a JSON null value stays `None`.
fn samples_from_response(response: &InfluxQLResponse) -> Vec<Sample> {
    let mut samples = Vec::new();
    let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) else {
        return samples;
    };

    for s in series {
        let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
        let value_idx = s.columns.iter().position(|c| c == "value").unwrap_or(1);

        for row in &s.values {
            let Some(timestamp) = row.get(time_idx).and_then(parse_time) else {
                continue;
            };
            let value = row.get(value_idx).and_then(|v| v.as_f64());
            samples.push(Sample::new(timestamp, value));
        }
    }

    // Stable sort keeps arrival order for equal timestamps
    samples.sort_by_key(|s| s.timestamp);
    samples
}

/// Pivot a `last(*)` row into a snapshot. Columns are named `last_<field>`.
fn snapshot_from_response(response: &InfluxQLResponse, sensor_keys: &[String]) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for key in sensor_keys {
        snapshot.values.insert(key.clone(), None);
    }

    let Some(s) = response
        .results
        .first()
        .and_then(|r| r.series.as_ref())
        .and_then(|series| series.first())
    else {
        return snapshot;
    };
    let Some(row) = s.values.first() else {
        return snapshot;
    };

    for (idx, column) in s.columns.iter().enumerate() {
        if column == "time" {
            snapshot.timestamp = row.get(idx).and_then(parse_time);
            continue;
        }
        let field = column.strip_prefix("last_").unwrap_or(column);
        if let Some(slot) = snapshot.values.get_mut(field) {
            *slot = row.get(idx).and_then(|v| v.as_f64());
        }
    }

    snapshot
}

/// Pivoted multi-field rows, one per timestamp, returned oldest first.
/// Columns that are not requested are ignored; requested fields missing from
/// the result stay `None`.
fn history_from_response(response: &InfluxQLResponse, sensor_keys: &[String]) -> Vec<HistoryRow> {
    let mut rows = Vec::new();
    let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) else {
        return rows;
    };

    for s in series {
        let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
        let field_idx: Vec<(&String, Option<usize>)> = sensor_keys
            .iter()
            .map(|key| (key, s.columns.iter().position(|c| c == key)))
            .collect();

        for row in &s.values {
            let Some(timestamp) = row.get(time_idx).and_then(parse_time) else {
                continue;
            };
            let values: BTreeMap<String, Option<f64>> = field_idx
                .iter()
                .map(|(key, idx)| {
                    let value = idx.and_then(|i| row.get(i)).and_then(|v| v.as_f64());
                    ((*key).clone(), value)
                })
                .collect();
            rows.push(HistoryRow { timestamp, values });
        }
    }

    // The query reads newest first to apply its limit
    rows.sort_by_key(|r| r.timestamp);
    rows
}

fn quoted_fields(sensor_keys: &[String]) -> String {
    sensor_keys
        .iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn query_series(
        &self,
        sensor_key: &str,
        range: &Lookback,
        aggregate_window: Option<&Lookback>,
    ) -> Result<Series> {
        let mut vars = self.query_vars(sensor_key, range);
        let template = match aggregate_window {
            Some(window) => {
                vars.insert("window".to_string(), window.to_string());
                &self.queries.aggregated_series
            }
            None => &self.queries.series,
        };

        let response = self.execute_query(&prepare_query(template, &vars)).await?;
        let samples = samples_from_response(&response);
        tracing::debug!("Got {} samples for {} over {}", samples.len(), sensor_key, range);

        // Bound the window handed to the analytics
        let samples = if samples.len() > self.max_points {
            Self::downsample_samples(samples, self.max_points)
        } else {
            samples
        };

        Ok(Series::new(sensor_key, samples))
    }

    async fn query_latest(&self, sensor_keys: &[String]) -> Result<Snapshot> {
        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), self.measurement.clone());

        let response = self
            .execute_query(&prepare_query(&self.queries.latest, &vars))
            .await?;
        Ok(snapshot_from_response(&response, sensor_keys))
    }

    async fn query_history(
        &self,
        sensor_keys: &[String],
        range: &Lookback,
        limit: usize,
    ) -> Result<Vec<HistoryRow>> {
        let mut vars = HashMap::new();
        vars.insert("fields".to_string(), quoted_fields(sensor_keys));
        vars.insert("measurement".to_string(), self.measurement.clone());
        vars.insert("range".to_string(), range.to_string());
        vars.insert("limit".to_string(), limit.to_string());

        let response = self
            .execute_query(&prepare_query(&self.queries.history, &vars))
            .await?;
        let rows = history_from_response(&response, sensor_keys);
        tracing::debug!("Got {} history rows over {}", rows.len(), range);
        Ok(rows)
    }
}

impl InfluxRepository {
    /// Downsample samples using bucket averaging
    fn downsample_samples(samples: Vec<Sample>, max_points: usize) -> Vec<Sample> {
        if samples.is_empty() || samples.len() <= max_points {
            return samples;
        }

        let bucket_size = (samples.len() as f64 / max_points as f64).ceil() as usize;
        let mut downsampled = Vec::with_capacity(max_points);

        for chunk in samples.chunks(bucket_size) {
            // Use middle sample's timestamp and the average of present values
            let mid_idx = chunk.len() / 2;
            let present: Vec<f64> = chunk
                .iter()
                .filter_map(|s| s.value)
                .filter(|v| v.is_finite())
                .collect();
            let avg_value = if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            };

            downsampled.push(Sample::new(chunk[mid_idx].timestamp, avg_value));
        }

        downsampled
    }
}
