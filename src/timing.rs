//! Parsing and formatting of the API's time and date strings.
//!
//! Result times arrive as `ss.t`, `m:ss.t` or `h:mm:ss.t`, optionally with a
//! leading `+` for behind-the-winner differences. Start times arrive as ISO
//! 8601 with or without a trailing `Z`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Converts a time string to seconds. Accepts `+diff`, `ss.t`, `mm:ss.t` and
/// `hh:mm:ss.t` forms; returns None for DNS markers and anything unparseable.
pub fn parse_time_seconds(value: &str) -> Option<f64> {
    let mut text = value.trim();
    if text.is_empty() || text == "-" {
        return None;
    }
    if let Some(stripped) = text.strip_prefix('+') {
        text = stripped;
    }

    let parts: Vec<&str> = text.split(':').collect();
    match parts.as_slice() {
        [secs] => secs.parse::<f64>().ok(),
        [mins, secs] => {
            let minutes = mins.parse::<i64>().ok()?;
            let seconds = secs.parse::<f64>().ok()?;
            Some(minutes as f64 * 60.0 + seconds)
        }
        [hours, mins, secs] => {
            let hours = hours.parse::<i64>().ok()?;
            let minutes = mins.parse::<i64>().ok()?;
            let seconds = secs.parse::<f64>().ok()?;
            Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
        }
        _ => None,
    }
}

/// Renders seconds as `m:ss.t`, or `h:mm:ss.t` when an hour is exceeded.
pub fn format_seconds(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor() as i64;
    let remainder = seconds - hours as f64 * 3600.0;
    let minutes = (remainder / 60.0).floor() as i64;
    let secs = remainder - minutes as f64 * 60.0;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:04.1}")
    } else {
        format!("{minutes}:{secs:04.1}")
    }
}

/// Formats a percentage with one decimal place, `-` when the denominator is 0.
pub fn format_pct(numerator: u32, denominator: u32) -> String {
    if denominator == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", 100.0 * f64::from(numerator) / f64::from(denominator))
}

/// Parses the date part of an ISO date or datetime string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Returns just the `YYYY-MM-DD` part of an ISO datetime string.
pub fn date_only(value: &str) -> &str {
    value.split('T').next().unwrap_or("")
}

/// Parses an ISO start time (with optional `Z` suffix) into a UTC instant.
/// Timestamps without an offset are assumed to be UTC, which is how the
/// results service serves them.
pub fn parse_start_datetime(value: &str) -> Option<DateTime<Utc>> {
    if !value.contains('T') {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD HH:MM` rendering of a start time, falling back to the date part.
pub fn format_start_datetime(value: &str) -> String {
    match parse_start_datetime(value) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => date_only(value).to_string(),
    }
}
