// Sensor profiles and the catalog they are looked up from
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::AnalysisError;

const BUILTIN_SENSORS: &str = include_str!("../../config/sensors.toml");

/// Inclusive `[min, max]` range considered normal for a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct SensorProfile {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    pub normal_min: f64,
    pub normal_max: f64,
    pub impact_low: String,
    pub impact_high: String,
    pub remedy_low: String,
    pub remedy_high: String,
}

impl SensorProfile {
    pub fn band(&self) -> Band {
        Band::new(self.normal_min, self.normal_max)
    }
}

#[derive(Debug, Deserialize)]
struct SensorTable {
    #[serde(default)]
    sensors: Vec<SensorProfile>,
}

/// Immutable table of sensor profiles, keyed by sensor key.
#[derive(Debug, Clone)]
pub struct SensorCatalog {
    profiles: Vec<SensorProfile>,
}

impl SensorCatalog {
    pub fn new(profiles: Vec<SensorProfile>) -> Result<Self, AnalysisError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if profile.key.trim().is_empty() {
                return Err(AnalysisError::InvalidCatalog(
                    "sensor key must not be empty".to_string(),
                ));
            }
            if !seen.insert(profile.key.as_str()) {
                return Err(AnalysisError::InvalidCatalog(format!(
                    "duplicate sensor key '{}'",
                    profile.key
                )));
            }
            if !profile.normal_min.is_finite()
                || !profile.normal_max.is_finite()
                || profile.normal_min > profile.normal_max
            {
                return Err(AnalysisError::InvalidCatalog(format!(
                    "sensor '{}' has an invalid normal range ({} - {})",
                    profile.key, profile.normal_min, profile.normal_max
                )));
            }
        }
        Ok(Self { profiles })
    }

    /// Parse a `[[sensors]]` TOML table.
    pub fn from_toml(source: &str) -> Result<Self, AnalysisError> {
        let table: SensorTable =
            toml::from_str(source).map_err(|e| AnalysisError::InvalidCatalog(e.to_string()))?;
        Self::new(table.sensors)
    }

    /// Profiles compiled into the binary.
    pub fn builtin() -> Result<Self, AnalysisError> {
        Self::from_toml(BUILTIN_SENSORS)
    }

    pub fn get(&self, key: &str) -> Result<&SensorProfile, AnalysisError> {
        self.profiles
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| AnalysisError::UnknownSensor(key.to_string()))
    }

    pub fn profiles(&self) -> &[SensorProfile] {
        &self.profiles
    }

    pub fn keys(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.key.clone()).collect()
    }
}
