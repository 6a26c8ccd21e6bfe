// Application layer - Analytics and use-case services
pub mod analysis_service;
pub mod analytics;
pub mod error;
pub mod overview_service;
pub mod sensor_service;
pub mod telemetry_repository;
