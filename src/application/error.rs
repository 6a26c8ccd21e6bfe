// Errors surfaced by the use-case services
use crate::domain::error::AnalysisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("telemetry query failed: {0:#}")]
    Repository(#[from] anyhow::Error),
}
