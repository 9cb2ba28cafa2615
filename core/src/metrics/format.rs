/// Shown wherever a figure is unknown rather than zero.
pub const UNKNOWN_PLACEHOLDER: &str = "--";

/// Two-decimal rendering used for seconds and cars/s.
pub fn format_fixed(value: f64) -> String {
    format!("{:.2}", value)
}

/// Seconds with two decimals, or the placeholder when unknown.
pub fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(sec) if sec.is_finite() => format_fixed(sec),
        _ => UNKNOWN_PLACEHOLDER.to_string(),
    }
}

/// `mm:ss` playback clock, flooring both fields.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
