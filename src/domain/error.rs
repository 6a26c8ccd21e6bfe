// Errors raised for malformed analysis requests
use thiserror::Error;

/// Degraded data (short or empty windows, zero baselines) never ends up
/// here; those are absorbed by the analytics and reported as unavailable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("unknown sensor '{0}'")]
    UnknownSensor(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("window for sensor '{sensor}' is not ordered by timestamp (sample {index})")]
    UnorderedWindow { sensor: String, index: usize },

    #[error("invalid time range '{0}'")]
    InvalidRange(String),

    #[error("invalid sensor catalog: {0}")]
    InvalidCatalog(String),
}
