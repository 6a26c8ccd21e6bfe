// Hydroponic telemetry analytics: trend, anomaly and threshold analysis of
// sensor windows, served over HTTP.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
