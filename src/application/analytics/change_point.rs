// Consecutive-sample jump detection
use crate::domain::analysis::{ChangeKind, ChangePoint};
use crate::domain::telemetry::Reading;

/// Default jump size, in percent of the previous value, that counts as a
/// change point.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 30.0;

/// Emit a change point at every reading whose change relative to the
/// previous reading exceeds `threshold_percent` in absolute value. Pairs
/// whose previous value is zero have no defined percent change and are
/// skipped.
pub fn detect_change_points(readings: &[Reading], threshold_percent: f64) -> Vec<ChangePoint> {
    readings
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev.value == 0.0 {
                return None;
            }

            let percent_change = (curr.value - prev.value) / prev.value.abs() * 100.0;
            if !percent_change.is_finite() || percent_change.abs() <= threshold_percent {
                return None;
            }

            let kind = if percent_change > 0.0 {
                ChangeKind::Spike
            } else {
                ChangeKind::Drop
            };
            Some(ChangePoint {
                timestamp: curr.timestamp,
                value: curr.value,
                kind,
                percent_change,
            })
        })
        .collect()
}
