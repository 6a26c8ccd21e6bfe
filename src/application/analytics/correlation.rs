// Two-point directional correlation between a pair of sensors
//
// Each series is split at floor(n/2) and the averages of both halves are
// compared. This is a qualitative agreement of direction, not a Pearson
// coefficient.
use super::statistics::mean;
use crate::domain::analysis::{CorrelationKind, CorrelationReport, SeriesDirection};

pub const DEFAULT_STABLE_RATIO: f64 = 0.02;
pub const DEFAULT_MIN_POINTS: usize = 10;

/// Direction of `values` from the first half to the second half. A relative
/// change below `stable_ratio` is stable. A zero first-half average only
/// counts as stable when the second half is zero too.
pub fn half_direction(values: &[f64], stable_ratio: f64) -> Option<SeriesDirection> {
    let mid = values.len() / 2;
    let first = mean(&values[..mid])?;
    let second = mean(&values[mid..])?;
    let change = second - first;

    let stable = if first == 0.0 {
        change == 0.0
    } else {
        (change / first).abs() < stable_ratio
    };

    Some(if stable {
        SeriesDirection::Stable
    } else if change > 0.0 {
        SeriesDirection::Up
    } else {
        SeriesDirection::Down
    })
}

pub fn correlate(
    primary: &[f64],
    secondary: &[f64],
    min_points: usize,
    stable_ratio: f64,
) -> CorrelationReport {
    let required = min_points.max(2);
    if primary.len() < required || secondary.len() < required {
        return report(CorrelationKind::InsufficientData, None, None);
    }

    let primary_direction = half_direction(primary, stable_ratio);
    let secondary_direction = half_direction(secondary, stable_ratio);

    let kind = match (primary_direction, secondary_direction) {
        (Some(SeriesDirection::Stable), _) | (_, Some(SeriesDirection::Stable)) => {
            CorrelationKind::NoStrongCorrelation
        }
        (Some(a), Some(b)) if a == b => CorrelationKind::Positive,
        (Some(_), Some(_)) => CorrelationKind::Negative,
        _ => CorrelationKind::InsufficientData,
    };

    report(kind, primary_direction, secondary_direction)
}

fn report(
    kind: CorrelationKind,
    primary_direction: Option<SeriesDirection>,
    secondary_direction: Option<SeriesDirection>,
) -> CorrelationReport {
    CorrelationReport {
        kind,
        text: kind.describe().to_string(),
        primary_direction,
        secondary_direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: f64, step: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[test]
    fn test_both_increasing_is_positive() {
        let report = correlate(&ramp(25.0, 0.5, 12), &ramp(60.0, 1.0, 12), 10, 0.02);
        assert_eq!(report.kind, CorrelationKind::Positive);
        assert_eq!(report.text, "positive correlation");
        assert_eq!(report.primary_direction, Some(SeriesDirection::Up));
    }

    #[test]
    fn test_opposite_directions_are_negative() {
        let report = correlate(&ramp(25.0, 0.5, 12), &ramp(80.0, -1.0, 12), 10, 0.02);
        assert_eq!(report.kind, CorrelationKind::Negative);
        assert_eq!(report.secondary_direction, Some(SeriesDirection::Down));
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let report = correlate(&ramp(25.0, 0.5, 9), &ramp(60.0, 1.0, 12), 10, 0.02);
        assert_eq!(report.kind, CorrelationKind::InsufficientData);
        assert_eq!(report.primary_direction, None);

        let report = correlate(&ramp(25.0, 0.5, 12), &[], 10, 0.02);
        assert_eq!(report.kind, CorrelationKind::InsufficientData);
    }

    #[test]
    fn test_flat_series_has_no_strong_correlation() {
        // half-to-half drift of 0.5% stays under the 2% ratio
        let flat = ramp(100.0, 0.1, 10);
        let report = correlate(&flat, &ramp(60.0, 1.0, 10), 10, 0.02);
        assert_eq!(report.primary_direction, Some(SeriesDirection::Stable));
        assert_eq!(report.kind, CorrelationKind::NoStrongCorrelation);
    }

    #[test]
    fn test_zero_baseline_direction() {
        let mut values = vec![0.0; 5];
        values.extend([1.0; 5]);
        assert_eq!(half_direction(&values, 0.02), Some(SeriesDirection::Up));
        assert_eq!(half_direction(&[0.0; 10], 0.02), Some(SeriesDirection::Stable));
    }
}
