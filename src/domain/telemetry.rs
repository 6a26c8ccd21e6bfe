// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::AnalysisError;

/// One raw sample as returned by the time-series store. `value` is `None`
/// when the field was absent for that timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

/// A sample that carries a usable, finite value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Time-ordered window of samples for a single sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub sensor_key: String,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(sensor_key: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            sensor_key: sensor_key.into(),
            samples,
        }
    }

    pub fn empty(sensor_key: impl Into<String>) -> Self {
        Self::new(sensor_key, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples with a present, finite value, in window order.
    pub fn readings(&self) -> Vec<Reading> {
        self.samples
            .iter()
            .filter_map(|s| match s.value {
                Some(value) if value.is_finite() => Some(Reading {
                    timestamp: s.timestamp,
                    value,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.readings().into_iter().map(|r| r.value).collect()
    }

    /// Value of the most recent sample, `None` if that sample is missing.
    pub fn latest_value(&self) -> Option<f64> {
        self.samples
            .last()
            .and_then(|s| s.value)
            .filter(|v| v.is_finite())
    }

    /// Rejects windows whose timestamps go backwards. Equal timestamps are
    /// allowed and keep their arrival order.
    pub fn ensure_ordered(&self) -> Result<(), AnalysisError> {
        match self
            .samples
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            Some(index) => Err(AnalysisError::UnorderedWindow {
                sensor: self.sensor_key.clone(),
                index: index + 1,
            }),
            None => Ok(()),
        }
    }
}

/// Latest value of every requested field, pivoted into a single row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub timestamp: Option<DateTime<Utc>>,
    pub values: BTreeMap<String, Option<f64>>,
}

impl Snapshot {
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values
            .get(key)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }
}

/// Several sensors at one timestamp, pivoted into a row. Serializes flat as
/// `{"date": ..., "ph": 6.1, "ec": null}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::ts;
    use super::*;

    #[test]
    fn test_readings_skip_missing_and_non_finite() {
        let series = Series::new(
            "ph",
            vec![
                Sample::new(ts(0), Some(6.0)),
                Sample::new(ts(1), None),
                Sample::new(ts(2), Some(f64::NAN)),
                Sample::new(ts(3), Some(6.2)),
            ],
        );

        let values = series.values();
        assert_eq!(values, vec![6.0, 6.2]);
        assert_eq!(series.readings()[1].timestamp, ts(3));
    }

    #[test]
    fn test_latest_value_is_last_sample() {
        let series = Series::new(
            "ph",
            vec![Sample::new(ts(0), Some(6.0)), Sample::new(ts(1), None)],
        );
        assert_eq!(series.latest_value(), None);
        assert_eq!(Series::empty("ph").latest_value(), None);
    }

    #[test]
    fn test_ensure_ordered() {
        let ordered = Series::new(
            "ec",
            vec![
                Sample::new(ts(0), Some(1.0)),
                Sample::new(ts(0), Some(1.1)),
                Sample::new(ts(1), Some(1.2)),
            ],
        );
        assert!(ordered.ensure_ordered().is_ok());

        let unordered = Series::new(
            "ec",
            vec![Sample::new(ts(2), Some(1.0)), Sample::new(ts(1), Some(1.1))],
        );
        match unordered.ensure_ordered() {
            Err(AnalysisError::UnorderedWindow { sensor, index }) => {
                assert_eq!(sensor, "ec");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_value_filters_missing() {
        let mut snapshot = Snapshot::default();
        snapshot.values.insert("ph".to_string(), Some(6.1));
        snapshot.values.insert("ec".to_string(), None);

        assert_eq!(snapshot.value("ph"), Some(6.1));
        assert_eq!(snapshot.value("ec"), None);
        assert_eq!(snapshot.value("light"), None);
    }

    #[test]
    fn test_history_row_serializes_flat() {
        let mut values = BTreeMap::new();
        values.insert("ec".to_string(), None);
        values.insert("ph".to_string(), Some(6.1));
        let row = HistoryRow {
            timestamp: ts(0),
            values,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date"], "2023-11-14T22:13:20Z");
        assert_eq!(json["ph"], 6.1);
        assert!(json["ec"].is_null());
        assert!(json.get("timestamp").is_none());
    }
}
