use crate::application::analytics::AnalysisSettings;
use crate::domain::sensor::{SensorCatalog, SensorProfile};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub influx: InfluxSettings,
    pub queries: QueryTemplates,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    pub measurement: String,
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_max_points() -> usize {
    500
}

/// InfluxQL templates. Placeholders: `${field}`, `${measurement}`,
/// `${range}`, `${window}` for aggregated queries and `${fields}`/`${limit}`
/// for history.
#[derive(Debug, Deserialize, Clone)]
pub struct QueryTemplates {
    pub series: String,
    pub aggregated_series: String,
    pub latest: String,
    pub history: String,
}

#[derive(Debug, Deserialize)]
struct SensorsFile {
    #[serde(default)]
    sensors: Vec<SensorProfile>,
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app"))
        .add_source(config::Environment::with_prefix("HYDRO").separator("__"))
        .build()?;

    parse_app_config(settings)
}

fn parse_app_config(settings: config::Config) -> anyhow::Result<AppConfig> {
    let app: AppConfig = settings.try_deserialize()?;
    app.analysis
        .validate()
        .context("Invalid [analysis] settings")?;
    Ok(app)
}

/// Load the sensor table from `config/sensors`, falling back to the profiles
/// compiled into the binary when the file is absent or empty.
pub fn load_sensor_catalog() -> anyhow::Result<SensorCatalog> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/sensors").required(false))
        .build()?;
    let file: SensorsFile = settings.try_deserialize()?;

    if file.sensors.is_empty() {
        tracing::warn!("No sensor profiles configured, using built-in profiles");
        return Ok(SensorCatalog::builtin()?);
    }
    Ok(SensorCatalog::new(file.sensors)?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
