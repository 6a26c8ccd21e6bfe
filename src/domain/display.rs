// Display helpers shared by the JSON surface
use serde::Serializer;

/// Marker rendered in place of a value that could not be computed.
pub const MISSING_MARKER: &str = "-";

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serialize `Some(v)` as `v` rounded to two decimals and `None` as `"-"`.
pub fn rounded_or_marker<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) if v.is_finite() => serializer.serialize_f64(round2(*v)),
        _ => serializer.serialize_str(MISSING_MARKER),
    }
}
