//! Display helpers for news items.

use chrono::{DateTime, Utc};

/// Renders how long ago `published_at` was, relative to `now`.
///
/// Timestamps in the future (clock skew between server and client) render as "just now".
#[must_use]
pub fn format_relative(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - published_at).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }

    let (value, unit) = match secs {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}
