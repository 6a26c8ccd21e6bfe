// Descriptive statistics over a window of values
use crate::domain::analysis::Summary;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation around `avg` (divides by `n`, not `n - 1`).
pub fn population_stddev(values: &[f64], avg: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Summarize a window of finite values. An empty window yields a summary
/// whose fields are all unavailable.
pub fn summarize(values: &[f64]) -> Summary {
    let Some(raw_avg) = mean(values) else {
        return Summary::unavailable();
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Rounding in the sum can push the mean an ulp past the extremes
    let avg = raw_avg.clamp(min, max);

    Summary {
        count: values.len(),
        avg: Some(avg),
        min: Some(min),
        max: Some(max),
        stddev: population_stddev(values, avg),
    }
}
