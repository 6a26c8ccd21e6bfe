// Trend estimation over the sample index
//
// Both models use the position of a value in the window as the time axis,
// never the wall-clock gap between samples.
use serde::Deserialize;

use crate::domain::analysis::{TrendDirection, TrendModel, TrendResult};

/// Tuning shared by both trend models.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrendSettings {
    pub alpha: f64,
    pub beta: f64,
    /// Percent per step beyond which a trend is reported as up or down.
    pub direction_threshold_percent: f64,
    /// Holt levels with a smaller magnitude yield a neutral trend.
    pub level_epsilon: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.3,
            direction_threshold_percent: 0.1,
            level_epsilon: 1e-9,
        }
    }
}

pub fn direction_of(percent_per_step: f64, threshold: f64) -> TrendDirection {
    if percent_per_step > threshold {
        TrendDirection::Up
    } else if percent_per_step < -threshold {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    }
}

/// Run the selected model. `None` means the window cannot support a trend.
pub fn estimate(values: &[f64], model: TrendModel, settings: &TrendSettings) -> Option<TrendResult> {
    match model {
        TrendModel::Exponential => exponential(values, settings.direction_threshold_percent),
        TrendModel::DoubleExponential => double_exponential(values, settings),
    }
}

/// Log-linear least squares fit of `ln(value)` against the sample index.
/// Non-positive values have no logarithm and are dropped; the remaining
/// points keep their original index.
pub fn exponential(values: &[f64], direction_threshold: f64) -> Option<TrendResult> {
    if values.len() < 2 {
        return None;
    }

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let y = v.ln();
            y.is_finite().then_some((i as f64, y))
        })
        .collect();
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), (x, y)| (sx + x, sy + y, sxy + x * y, sxx + x * x),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let percent_per_step = (slope.exp() - 1.0) * 100.0;
    if !percent_per_step.is_finite() {
        return None;
    }

    Some(TrendResult::Exponential {
        percent_per_step,
        direction: direction_of(percent_per_step, direction_threshold),
        slope,
    })
}

/// Holt's linear trend. Starts from `level = y0`, `trend = y1 - y0` and
/// smooths every value from `y1` onwards.
pub fn double_exponential(values: &[f64], settings: &TrendSettings) -> Option<TrendResult> {
    if values.len() < 2 {
        return None;
    }

    let (alpha, beta) = (settings.alpha, settings.beta);
    let mut level = values[0];
    let mut trend = values[1] - values[0];

    for &y in &values[1..] {
        let previous_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - previous_level) + (1.0 - beta) * trend;
    }

    if !level.is_finite() || !trend.is_finite() {
        return None;
    }

    let percent_per_step = if level.abs() < settings.level_epsilon {
        tracing::debug!("Holt level {} is too close to zero, trend reported as neutral", level);
        0.0
    } else {
        trend / level * 100.0
    };

    Some(TrendResult::DoubleExponential {
        percent_per_step,
        direction: direction_of(percent_per_step, settings.direction_threshold_percent),
        level,
        trend_per_step: trend,
    })
}
