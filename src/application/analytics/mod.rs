// Trend and anomaly analytics over a single window of sensor values
pub mod anomaly;
pub mod change_point;
pub mod correlation;
pub mod engine;
pub mod recommendation;
pub mod stability;
pub mod statistics;
pub mod threshold;
pub mod trend;

pub use engine::{AnalysisEngine, AnalysisRequest, AnalysisSettings};
