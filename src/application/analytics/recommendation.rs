// Human readable diagnosis for the latest value of a sensor
use crate::domain::analysis::{Recommendation, RecommendationStatus, TrendDirection, TrendResult};
use crate::domain::sensor::SensorProfile;

fn trend_clause(trend: Option<&TrendResult>) -> Option<String> {
    let trend = trend?;
    match trend.direction() {
        TrendDirection::Up => Some(format!(
            "Data shows an upward trend of {:.1}% per step.",
            trend.percent_per_step()
        )),
        TrendDirection::Down => Some(format!(
            "Data shows a downward trend of {:.1}% per step.",
            trend.percent_per_step().abs()
        )),
        TrendDirection::Neutral => None,
    }
}

/// Below the band is a warning, above it is critical. Inside the band the
/// text carries the trend clause or states a stable condition; outside it the
/// trend clause is appended after the remedy.
pub fn recommend(
    profile: &SensorProfile,
    value: Option<f64>,
    trend: Option<&TrendResult>,
) -> Recommendation {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => {
            return Recommendation {
                title: "Data Not Available".to_string(),
                text: "No recent data to analyse.".to_string(),
                status: RecommendationStatus::Unknown,
            };
        }
    };

    let band = profile.band();
    let trend_text = trend_clause(trend);

    let (status, title, mut text) = if value < band.min {
        (
            RecommendationStatus::Warning,
            format!("{} too low", profile.label),
            format!(
                "Current value {}, which is {:.1} below the normal limit ({}). This condition {} {}",
                value,
                band.min - value,
                band.min,
                profile.impact_low,
                profile.remedy_low
            ),
        )
    } else if value > band.max {
        (
            RecommendationStatus::Critical,
            format!("{} too high", profile.label),
            format!(
                "Current value {}, which is {:.1} above the normal limit ({}). This condition {} {}",
                value,
                value - band.max,
                band.max,
                profile.impact_high,
                profile.remedy_high
            ),
        )
    } else {
        let closing = trend_text
            .clone()
            .unwrap_or_else(|| "Condition is stable.".to_string());
        (
            RecommendationStatus::Normal,
            format!("{} optimal", profile.label),
            format!(
                "Value {} is within the safe range ({} - {}). {}",
                value, band.min, band.max, closing
            ),
        )
    };

    if status != RecommendationStatus::Normal {
        if let Some(clause) = trend_text {
            text.push(' ');
            text.push_str(&clause);
        }
    }

    Recommendation {
        title,
        text,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sensor::SensorCatalog;

    fn profile(key: &str) -> SensorProfile {
        SensorCatalog::builtin().unwrap().get(key).unwrap().clone()
    }

    fn rising() -> TrendResult {
        TrendResult::Exponential {
            percent_per_step: 2.345,
            direction: TrendDirection::Up,
            slope: 0.0232,
        }
    }

    #[test]
    fn test_low_ph_is_warning_with_gap() {
        let ph = profile("ph");
        let rec = recommend(&ph, Some(4.0), None);

        assert_eq!(rec.status, RecommendationStatus::Warning);
        assert!(rec.title.contains("too low"));
        assert!(rec.text.contains("1.5"));
        assert!(rec.text.contains(&ph.impact_low));
        assert!(rec.text.ends_with(&ph.remedy_low));
    }

    #[test]
    fn test_high_value_is_critical() {
        let ec = profile("ec");
        let rec = recommend(&ec, Some(3.0), None);

        assert_eq!(rec.status, RecommendationStatus::Critical);
        assert_eq!(rec.title, "EC too high");
        assert!(rec.text.contains("0.5 above the normal limit (2.5)"));
        assert!(rec.text.contains(&ec.remedy_high));
    }

    #[test]
    fn test_missing_value_is_unknown() {
        let rec = recommend(&profile("ph"), None, Some(&rising()));
        assert_eq!(rec.status, RecommendationStatus::Unknown);
        assert_eq!(rec.text, "No recent data to analyse.");
    }

    #[test]
    fn test_normal_without_trend_is_stable() {
        let rec = recommend(&profile("ph"), Some(6.0), None);
        assert_eq!(rec.status, RecommendationStatus::Normal);
        assert_eq!(
            rec.text,
            "Value 6 is within the safe range (5.5 - 6.5). Condition is stable."
        );
    }

    #[test]
    fn test_normal_with_trend_mentions_trend() {
        let rec = recommend(&profile("ph"), Some(6.5), Some(&rising()));
        assert_eq!(rec.status, RecommendationStatus::Normal);
        assert!(rec.text.ends_with("Data shows an upward trend of 2.3% per step."));
        assert!(!rec.text.contains("stable"));
    }

    #[test]
    fn test_neutral_trend_is_not_mentioned() {
        let neutral = TrendResult::DoubleExponential {
            percent_per_step: 0.01,
            direction: TrendDirection::Neutral,
            level: 6.0,
            trend_per_step: 0.0006,
        };
        let rec = recommend(&profile("ph"), Some(7.0), Some(&neutral));
        assert_eq!(rec.status, RecommendationStatus::Critical);
        assert!(!rec.text.contains("trend"));
    }

    #[test]
    fn test_breach_appends_trend_after_remedy() {
        let falling = TrendResult::Exponential {
            percent_per_step: -4.0,
            direction: TrendDirection::Down,
            slope: -0.0408,
        };
        let temperature = profile("temperature");
        let rec = recommend(&temperature, Some(22.0), Some(&falling));
        let expected_tail = format!(
            "{} Data shows a downward trend of 4.0% per step.",
            temperature.remedy_low
        );
        assert!(rec.text.ends_with(&expected_tail));
    }
}
