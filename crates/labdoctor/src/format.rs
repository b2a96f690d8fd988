//! Value formatting shared by checks and the renderer.
//!
//! Sits below both so checks never reach into the report layer.

use chrono::{DateTime, Duration, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        None => "NULL".to_string(),
    }
}

/// Formats a span as `[Nd ]HH:MM:SS`.
pub fn span(d: Duration) -> String {
    let sign = if d < Duration::zero() { "-" } else { "" };
    let total = d.num_seconds().abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    if days > 0 {
        format!("{}{}d {:02}:{:02}:{:02}", sign, days, hours, minutes, seconds)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    }
}

pub fn optional_span(d: Option<Duration>) -> String {
    d.map(span).unwrap_or_else(|| "unknown".to_string())
}

pub fn seconds(secs: f64) -> String {
    format!("{:.2} seconds", secs)
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn or_null(value: Option<&str>) -> String {
    value.unwrap_or("NULL").to_string()
}
