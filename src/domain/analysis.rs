// Analysis result models. All of them are recomputed per request.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::display::rounded_or_marker;
use super::error::AnalysisError;
use super::sensor::SensorProfile;

/// Descriptive statistics of a window. Values are kept unrounded; rounding
/// happens at serialization time only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    #[serde(serialize_with = "rounded_or_marker")]
    pub avg: Option<f64>,
    #[serde(serialize_with = "rounded_or_marker")]
    pub min: Option<f64>,
    #[serde(serialize_with = "rounded_or_marker")]
    pub max: Option<f64>,
    #[serde(serialize_with = "rounded_or_marker")]
    pub stddev: Option<f64>,
}

impl Summary {
    pub fn unavailable() -> Self {
        Self {
            count: 0,
            avg: None,
            min: None,
            max: None,
            stddev: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    Normal,
    Warning,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub status_type: StatusType,
    pub status_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stability {
    pub percent: u32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Outlier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Spike,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub kind: ChangeKind,
    /// Signed change relative to the previous sample, in percent.
    pub percent_change: f64,
}

/// Coarse direction of a series between its first and second half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    Positive,
    Negative,
    NoStrongCorrelation,
    InsufficientData,
}

impl CorrelationKind {
    pub fn describe(self) -> &'static str {
        match self {
            CorrelationKind::Positive => "positive correlation",
            CorrelationKind::Negative => "negative correlation",
            CorrelationKind::NoStrongCorrelation => "no strong correlation",
            CorrelationKind::InsufficientData => "no correlation (insufficient data)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub kind: CorrelationKind,
    pub text: String,
    pub primary_direction: Option<SeriesDirection>,
    pub secondary_direction: Option<SeriesDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

/// Trend model selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendModel {
    #[default]
    Exponential,
    DoubleExponential,
}

impl FromStr for TrendModel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exponential" => Ok(TrendModel::Exponential),
            "double_exponential" | "doubleExponential" | "holt" => {
                Ok(TrendModel::DoubleExponential)
            }
            other => Err(AnalysisError::InvalidParameter {
                name: "model",
                reason: format!("unknown trend model '{}'", other),
            }),
        }
    }
}

impl fmt::Display for TrendModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendModel::Exponential => write!(f, "exponential"),
            TrendModel::DoubleExponential => write!(f, "double_exponential"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TrendResult {
    Exponential {
        percent_per_step: f64,
        direction: TrendDirection,
        slope: f64,
    },
    DoubleExponential {
        percent_per_step: f64,
        direction: TrendDirection,
        level: f64,
        trend_per_step: f64,
    },
}

impl TrendResult {
    pub fn percent_per_step(&self) -> f64 {
        match self {
            TrendResult::Exponential {
                percent_per_step, ..
            }
            | TrendResult::DoubleExponential {
                percent_per_step, ..
            } => *percent_per_step,
        }
    }

    pub fn direction(&self) -> TrendDirection {
        match self {
            TrendResult::Exponential { direction, .. }
            | TrendResult::DoubleExponential { direction, .. } => *direction,
        }
    }

    /// Holt forecast `level + k * trend` for `k = 1..=steps`. The exponential
    /// model carries no level and forecasts nothing.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        match self {
            TrendResult::Exponential { .. } => Vec::new(),
            TrendResult::DoubleExponential {
                level,
                trend_per_step,
                ..
            } => (1..=steps)
                .map(|k| level + k as f64 * trend_per_step)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Normal,
    Warning,
    Critical,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub text: String,
    pub status: RecommendationStatus,
}

/// Sensor identity echoed back in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRef {
    pub key: String,
    pub label: String,
    pub unit: String,
}

impl From<&SensorProfile> for SensorRef {
    fn from(profile: &SensorProfile) -> Self {
        Self {
            key: profile.key.clone(),
            label: profile.label.clone(),
            unit: profile.unit.clone(),
        }
    }
}

/// Composed result of one analysis invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub sensor: SensorRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_sensor: Option<SensorRef>,
    pub sample_count: usize,
    pub latest: Option<f64>,
    pub stats: Summary,
    pub classification: Classification,
    pub stability: Stability,
    pub anomalies: Vec<AnomalyPoint>,
    pub change_points: Vec<ChangePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationReport>,
    pub trend_model: TrendModel,
    pub trend: Option<TrendResult>,
    pub forecast: Vec<f64>,
    pub recommendation: Recommendation,
}
