// Band classification of a scalar value
use crate::domain::analysis::{Classification, StatusType};
use crate::domain::sensor::Band;

fn band_label(band: &Band, unit: &str) -> String {
    if unit.is_empty() {
        format!("{} - {}", band.min, band.max)
    } else {
        format!("{} - {} {}", band.min, band.max, unit)
    }
}

/// Classify `value` against `band`. Values equal to either edge are normal;
/// a missing or non-finite value is unknown.
pub fn classify(value: Option<f64>, band: &Band, unit: &str) -> Classification {
    match value {
        Some(v) if v.is_finite() => {
            if band.contains(v) {
                Classification {
                    status_type: StatusType::Normal,
                    status_text: format!("Within normal range ({})", band_label(band, unit)),
                }
            } else {
                Classification {
                    status_type: StatusType::Warning,
                    status_text: format!("Value out of range ({})", band_label(band, unit)),
                }
            }
        }
        _ => Classification {
            status_type: StatusType::Unknown,
            status_text: "Data not available".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analytics::statistics::summarize;

    #[test]
    fn test_band_edges_are_normal() {
        let band = Band::new(5.5, 6.5);
        assert_eq!(classify(Some(5.5), &band, "").status_type, StatusType::Normal);
        assert_eq!(classify(Some(6.5), &band, "").status_type, StatusType::Normal);
    }

    #[test]
    fn test_outside_band_is_warning() {
        let band = Band::new(25.0, 30.0);
        let low = classify(Some(24.99), &band, "°C");
        let high = classify(Some(30.01), &band, "°C");
        assert_eq!(low.status_type, StatusType::Warning);
        assert_eq!(high.status_type, StatusType::Warning);
        assert_eq!(low.status_text, "Value out of range (25 - 30 °C)");
    }

    #[test]
    fn test_normal_text_states_band() {
        let result = classify(Some(6.0), &Band::new(5.5, 6.5), "");
        assert_eq!(result.status_text, "Within normal range (5.5 - 6.5)");
    }

    #[test]
    fn test_unit_is_separated_from_band() {
        let result = classify(Some(1.5), &Band::new(1.2, 2.5), "mS/cm");
        assert_eq!(result.status_text, "Within normal range (1.2 - 2.5 mS/cm)");
    }

    #[test]
    fn test_unavailable_summary_is_unknown() {
        let summary = summarize(&[]);
        let result = classify(summary.avg, &Band::new(5.5, 6.5), "");
        assert_eq!(result.status_type, StatusType::Unknown);
        assert_eq!(
            classify(Some(f64::NAN), &Band::new(0.0, 1.0), "").status_type,
            StatusType::Unknown
        );
    }
}
