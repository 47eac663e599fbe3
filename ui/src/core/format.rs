//! Formatting helpers for presenting scores and metrics.

pub fn format_ms(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.0} ms")
    } else {
        "—".to_string()
    }
}

/// Accuracy values already expressed in percent (0–100).
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.0}%")
    } else {
        "—".to_string()
    }
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "—".to_string()
    }
}

/// Signed score deltas, e.g. `+10` / `-5`.
pub fn format_points(points: i32) -> String {
    if points > 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}
