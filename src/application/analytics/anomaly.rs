// Tukey fence outlier detection
use crate::domain::analysis::{AnomalyKind, AnomalyPoint};
use crate::domain::telemetry::Reading;

/// Flag readings outside `[Q1 - k*IQR, Q3 + k*IQR]`. Quartiles are taken
/// positionally (`floor(0.25 n)`, `floor(0.75 n)`) from the sorted values,
/// without interpolation. Windows shorter than `min_points` report nothing.
/// Output keeps the window order.
pub fn detect_outliers(
    readings: &[Reading],
    min_points: usize,
    fence_multiplier: f64,
) -> Vec<AnomalyPoint> {
    let n = readings.len();
    if n < min_points.max(1) {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = readings.iter().map(|r| r.value).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = sorted[(0.25 * n as f64).floor() as usize];
    let q3 = sorted[(0.75 * n as f64).floor() as usize];
    let iqr = q3 - q1;
    let lower = q1 - fence_multiplier * iqr;
    let upper = q3 + fence_multiplier * iqr;

    readings
        .iter()
        .filter(|r| r.value < lower || r.value > upper)
        .map(|r| AnomalyPoint {
            timestamp: r.timestamp,
            value: r.value,
            kind: AnomalyKind::Outlier,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::fixtures::{series, ts};

    #[test]
    fn test_flags_single_spike() {
        let mut values = vec![1.0; 10];
        values.push(100.0);
        let readings = series("ph", &values).readings();

        let anomalies = detect_outliers(&readings, 10, 1.5);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].value, 100.0);
        assert_eq!(anomalies[0].timestamp, ts(10));
        assert_eq!(anomalies[0].kind, AnomalyKind::Outlier);
    }

    #[test]
    fn test_short_window_reports_nothing() {
        let readings = series("ph", &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 500.0]).readings();
        assert!(detect_outliers(&readings, 10, 1.5).is_empty());
        assert!(detect_outliers(&[], 10, 1.5).is_empty());
    }

    #[test]
    fn test_preserves_window_order() {
        let values = [
            -50.0, 6.0, 6.1, 6.2, 6.0, 6.1, 6.2, 6.0, 6.1, 6.2, 6.1, 80.0,
        ];
        let readings = series("ph", &values).readings();
        let anomalies = detect_outliers(&readings, 10, 1.5);

        let flagged: Vec<f64> = anomalies.iter().map(|a| a.value).collect();
        assert_eq!(flagged, vec![-50.0, 80.0]);
        assert!(anomalies[0].timestamp < anomalies[1].timestamp);
    }

    #[test]
    fn test_smooth_window_has_no_outliers() {
        let values: Vec<f64> = (0..20).map(|i| 6.0 + i as f64 * 0.01).collect();
        let readings = series("ph", &values).readings();
        assert!(detect_outliers(&readings, 10, 1.5).is_empty());
    }
}
