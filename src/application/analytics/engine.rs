// Analysis engine - Composes the analytics into one report per request
use serde::Deserialize;
use std::sync::Arc;

use super::trend::TrendSettings;
use super::{anomaly, change_point, correlation, recommendation, stability, statistics, threshold, trend};
use crate::domain::analysis::{AnalysisReport, SensorRef, TrendModel};
use crate::domain::error::AnalysisError;
use crate::domain::sensor::SensorCatalog;
use crate::domain::telemetry::Series;

/// Tunable constants of the analytics, loaded from the `[analysis]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub change_threshold_percent: f64,
    pub correlation_stable_ratio: f64,
    pub correlation_min_points: usize,
    pub anomaly_min_points: usize,
    pub iqr_multiplier: f64,
    pub smoothing_alpha: f64,
    pub smoothing_beta: f64,
    pub trend_direction_threshold_percent: f64,
    pub level_epsilon: f64,
    pub forecast_steps: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let trend = TrendSettings::default();
        Self {
            change_threshold_percent: change_point::DEFAULT_THRESHOLD_PERCENT,
            correlation_stable_ratio: correlation::DEFAULT_STABLE_RATIO,
            correlation_min_points: correlation::DEFAULT_MIN_POINTS,
            anomaly_min_points: 10,
            iqr_multiplier: 1.5,
            smoothing_alpha: trend.alpha,
            smoothing_beta: trend.beta,
            trend_direction_threshold_percent: trend.direction_threshold_percent,
            level_epsilon: trend.level_epsilon,
            forecast_steps: 3,
        }
    }
}

impl AnalysisSettings {
    /// Check the configured constants once, before any request relies on them.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        smoothing_factor("smoothing_alpha", Some(self.smoothing_alpha), self.smoothing_alpha)?;
        smoothing_factor("smoothing_beta", Some(self.smoothing_beta), self.smoothing_beta)?;
        non_negative("change_threshold_percent", self.change_threshold_percent)?;
        non_negative("correlation_stable_ratio", self.correlation_stable_ratio)?;
        non_negative("iqr_multiplier", self.iqr_multiplier)?;
        non_negative(
            "trend_direction_threshold_percent",
            self.trend_direction_threshold_percent,
        )?;
        non_negative("level_epsilon", self.level_epsilon)?;
        Ok(())
    }
}

/// One analysis invocation. Optional tuning falls back to the engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub primary: Series,
    pub secondary: Option<Series>,
    pub trend_model: TrendModel,
    pub change_threshold_percent: Option<f64>,
    pub smoothing_alpha: Option<f64>,
    pub smoothing_beta: Option<f64>,
}

impl AnalysisRequest {
    pub fn new(primary: Series, trend_model: TrendModel) -> Self {
        Self {
            primary,
            secondary: None,
            trend_model,
            change_threshold_percent: None,
            smoothing_alpha: None,
            smoothing_beta: None,
        }
    }

    pub fn with_secondary(mut self, secondary: Series) -> Self {
        self.secondary = Some(secondary);
        self
    }
}

fn smoothing_factor(name: &'static str, value: Option<f64>, default: f64) -> Result<f64, AnalysisError> {
    let factor = value.unwrap_or(default);
    if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
        Ok(factor)
    } else {
        Err(AnalysisError::InvalidParameter {
            name,
            reason: format!("must be within (0, 1], got {}", factor),
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, AnalysisError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AnalysisError::InvalidParameter {
            name,
            reason: format!("must be a non-negative number, got {}", value),
        })
    }
}

/// Stateless: every call works only on the window it is handed.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    catalog: Arc<SensorCatalog>,
    settings: AnalysisSettings,
}

impl AnalysisEngine {
    pub fn new(catalog: Arc<SensorCatalog>, settings: AnalysisSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    fn trend_settings(&self, request: &AnalysisRequest) -> Result<TrendSettings, AnalysisError> {
        Ok(TrendSettings {
            alpha: smoothing_factor("alpha", request.smoothing_alpha, self.settings.smoothing_alpha)?,
            beta: smoothing_factor("beta", request.smoothing_beta, self.settings.smoothing_beta)?,
            direction_threshold_percent: self.settings.trend_direction_threshold_percent,
            level_epsilon: self.settings.level_epsilon,
        })
    }

    fn change_threshold(&self, request: &AnalysisRequest) -> Result<f64, AnalysisError> {
        let threshold = request
            .change_threshold_percent
            .unwrap_or(self.settings.change_threshold_percent);
        non_negative("change_threshold", threshold)
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let profile = self.catalog.get(&request.primary.sensor_key)?;
        let secondary_profile = request
            .secondary
            .as_ref()
            .map(|s| self.catalog.get(&s.sensor_key))
            .transpose()?;

        request.primary.ensure_ordered()?;
        if let Some(secondary) = &request.secondary {
            secondary.ensure_ordered()?;
        }
        let trend_settings = self.trend_settings(request)?;
        let change_threshold = self.change_threshold(request)?;

        let readings = request.primary.readings();
        let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
        tracing::debug!(
            "Analyzing {} with {} of {} samples usable, model {}",
            profile.key,
            values.len(),
            request.primary.len(),
            request.trend_model
        );

        let band = profile.band();
        let stats = statistics::summarize(&values);
        let classification = threshold::classify(stats.avg, &band, &profile.unit);
        let stability = stability::score(&values, &band);
        let anomalies = anomaly::detect_outliers(
            &readings,
            self.settings.anomaly_min_points,
            self.settings.iqr_multiplier,
        );
        let change_points = change_point::detect_change_points(&readings, change_threshold);

        let correlation = request.secondary.as_ref().map(|secondary| {
            correlation::correlate(
                &values,
                &secondary.values(),
                self.settings.correlation_min_points,
                self.settings.correlation_stable_ratio,
            )
        });

        let trend = trend::estimate(&values, request.trend_model, &trend_settings);
        if trend.is_none() {
            tracing::debug!("Not enough data for a {} trend on {}", request.trend_model, profile.key);
        }
        let forecast = trend
            .as_ref()
            .map(|t| t.forecast(self.settings.forecast_steps))
            .unwrap_or_default();

        let latest = request.primary.latest_value();
        let recommendation = recommendation::recommend(profile, latest, trend.as_ref());

        Ok(AnalysisReport {
            sensor: SensorRef::from(profile),
            secondary_sensor: secondary_profile.map(SensorRef::from),
            sample_count: values.len(),
            latest,
            stats,
            classification,
            stability,
            anomalies,
            change_points,
            correlation,
            trend_model: request.trend_model,
            trend,
            forecast,
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{
        ChangeKind, CorrelationKind, RecommendationStatus, StatusType, TrendDirection, TrendResult,
    };
    use crate::domain::telemetry::fixtures::{series, ts};
    use crate::domain::telemetry::Sample;

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(
            Arc::new(SensorCatalog::builtin().unwrap()),
            AnalysisSettings::default(),
        )
    }

    #[test]
    fn test_full_pipeline() {
        let mut values: Vec<f64> = (0..12).map(|i| 26.0 + i as f64 * 0.2).collect();
        values.push(45.0);
        let request = AnalysisRequest::new(series("temperature", &values), TrendModel::DoubleExponential)
            .with_secondary(series("humidity", &(0..13).map(|i| 60.0 + i as f64).collect::<Vec<_>>()));

        let report = engine().analyze(&request).unwrap();

        assert_eq!(report.sensor.key, "temperature");
        assert_eq!(report.secondary_sensor.as_ref().unwrap().key, "humidity");
        assert_eq!(report.sample_count, 13);
        assert_eq!(report.latest, Some(45.0));
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].value, 45.0);
        assert_eq!(report.change_points.len(), 1);
        assert_eq!(report.change_points[0].kind, ChangeKind::Spike);
        assert_eq!(report.correlation.as_ref().unwrap().kind, CorrelationKind::Positive);
        assert_eq!(report.stability.percent, 92);
        assert!(matches!(report.trend, Some(TrendResult::DoubleExponential { .. })));
        assert_eq!(report.forecast.len(), 3);
        assert_eq!(report.recommendation.status, RecommendationStatus::Critical);
    }

    #[test]
    fn test_empty_window_degrades() {
        let request = AnalysisRequest::new(Series::empty("ph"), TrendModel::Exponential);
        let report = engine().analyze(&request).unwrap();

        assert_eq!(report.stats.avg, None);
        assert_eq!(report.classification.status_type, StatusType::Unknown);
        assert_eq!(report.stability.percent, 0);
        assert!(report.anomalies.is_empty());
        assert!(report.change_points.is_empty());
        assert_eq!(report.trend, None);
        assert!(report.forecast.is_empty());
        assert_eq!(report.recommendation.status, RecommendationStatus::Unknown);
    }

    #[test]
    fn test_missing_values_are_filtered() {
        let window = Series::new(
            "ph",
            vec![
                Sample::new(ts(0), Some(6.0)),
                Sample::new(ts(1), None),
                Sample::new(ts(2), Some(f64::INFINITY)),
                Sample::new(ts(3), Some(6.2)),
            ],
        );
        let report = engine()
            .analyze(&AnalysisRequest::new(window, TrendModel::Exponential))
            .unwrap();

        assert_eq!(report.sample_count, 2);
        assert!((report.stats.avg.unwrap() - 6.1).abs() < 1e-9);
        assert_eq!(report.trend.unwrap().direction(), TrendDirection::Up);
    }

    #[test]
    fn test_unknown_sensor_is_rejected() {
        let request = AnalysisRequest::new(series("co2", &[400.0, 410.0]), TrendModel::Exponential);
        assert_eq!(
            engine().analyze(&request),
            Err(AnalysisError::UnknownSensor("co2".to_string()))
        );

        let request = AnalysisRequest::new(series("ph", &[6.0]), TrendModel::Exponential)
            .with_secondary(series("co2", &[400.0]));
        assert!(matches!(
            engine().analyze(&request),
            Err(AnalysisError::UnknownSensor(_))
        ));
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let mut request = AnalysisRequest::new(series("ph", &[6.0, 6.1]), TrendModel::DoubleExponential);
        request.smoothing_alpha = Some(1.5);
        assert!(matches!(
            engine().analyze(&request),
            Err(AnalysisError::InvalidParameter { name: "alpha", .. })
        ));

        request.smoothing_alpha = None;
        request.change_threshold_percent = Some(-5.0);
        assert!(matches!(
            engine().analyze(&request),
            Err(AnalysisError::InvalidParameter { name: "change_threshold", .. })
        ));
    }

    #[test]
    fn test_settings_validation() {
        assert_eq!(AnalysisSettings::default().validate(), Ok(()));

        let settings = AnalysisSettings {
            smoothing_alpha: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(AnalysisError::InvalidParameter { name: "smoothing_alpha", .. })
        ));

        let settings = AnalysisSettings {
            iqr_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(AnalysisError::InvalidParameter { name: "iqr_multiplier", .. })
        ));
    }

    #[test]
    fn test_constant_window_on_band_edge_is_normal() {
        let request = AnalysisRequest::new(series("ec", &[1.2; 10]), TrendModel::Exponential);
        let report = engine().analyze(&request).unwrap();

        assert_eq!(report.stats.avg, Some(1.2));
        assert_eq!(report.classification.status_type, StatusType::Normal);
        assert_eq!(report.stability.percent, 100);
        assert_eq!(report.recommendation.status, RecommendationStatus::Normal);
    }

    #[test]
    fn test_request_overrides_change_threshold() {
        let mut request = AnalysisRequest::new(series("ec", &[10.0, 9.0]), TrendModel::Exponential);
        assert!(engine().analyze(&request).unwrap().change_points.is_empty());

        request.change_threshold_percent = Some(5.0);
        let report = engine().analyze(&request).unwrap();
        assert_eq!(report.change_points.len(), 1);
        assert_eq!(report.change_points[0].kind, ChangeKind::Drop);
    }

    #[test]
    fn test_unordered_window_is_rejected() {
        let window = Series::new(
            "ph",
            vec![Sample::new(ts(5), Some(6.0)), Sample::new(ts(1), Some(6.1))],
        );
        assert!(matches!(
            engine().analyze(&AnalysisRequest::new(window, TrendModel::Exponential)),
            Err(AnalysisError::UnorderedWindow { .. })
        ));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let values: Vec<f64> = (0..40).map(|i| 6.0 + ((i * 7) % 11) as f64 * 0.05).collect();
        let request = AnalysisRequest::new(series("ph", &values), TrendModel::DoubleExponential)
            .with_secondary(series("ec", &values));
        let engine = engine();

        let first = engine.analyze(&request).unwrap();
        let second = engine.analyze(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
