//! Alert countdown text.

use chrono::{DateTime, Duration, Utc};

/// Formats a duration as `H:MM:SS`, using its absolute value.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.num_seconds().abs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// The countdown line for an alert: `Starts in …` before `start`, `Started … ago` after.
pub fn countdown_label(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if now < start {
        format!("Starts in {}", format_hms(start - now))
    } else {
        format!("Started {} ago", format_hms(now - start))
    }
}
