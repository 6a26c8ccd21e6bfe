// Share of a window that stays inside the normal band
use crate::domain::analysis::Stability;
use crate::domain::sensor::Band;

pub fn score(values: &[f64], band: &Band) -> Stability {
    if values.is_empty() {
        return Stability {
            percent: 0,
            text: "Insufficient data to assess stability".to_string(),
        };
    }

    let inside = values.iter().filter(|v| band.contains(**v)).count();
    let percent = (inside as f64 / values.len() as f64 * 100.0).round() as u32;

    Stability {
        percent,
        text: format!(
            "{}% of {} readings within normal range",
            percent,
            values.len()
        ),
    }
}
