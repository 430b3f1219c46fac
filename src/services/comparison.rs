use crate::domain::metric::{MetricResult, Trend, round1};

/// Compares a figure from the analysed period (`value_a`) with the preceding
/// period (`value_b`).
///
/// `percent_change` is relative to `|value_b|`. From a zero baseline it is
/// 100 for any nonzero new value and 0 when both are zero.
pub fn compare(value_a: f64, value_b: f64, unit: &str) -> MetricResult {
    let delta = value_a - value_b;
    let percent_change = if value_b != 0.0 {
        ((delta / value_b.abs()) * 100.0).round()
    } else if value_a != 0.0 {
        100.0
    } else {
        0.0
    };

    MetricResult {
        value: round1(value_a),
        unit: unit.to_string(),
        trend: Trend::from_delta(delta),
        delta: round1(delta),
        percent_change,
    }
}
