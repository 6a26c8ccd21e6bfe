// Domain layer - Value objects shared by the analytics and the services
pub mod analysis;
pub mod display;
pub mod error;
pub mod range;
pub mod sensor;
pub mod telemetry;
