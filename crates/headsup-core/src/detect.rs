//! Upcoming-meeting detection.
//!
//! Each minute tick asks the provider for events starting in the one-second
//! slot `[now + 60s, now + 61s)` and keeps those whose start lies within one
//! second of `now + 60s`.
//!
//! There is no record of which events were already announced. A tick that
//! fires late skips a meeting and two ticks landing in the same slot announce it
//! twice.

use chrono::{DateTime, Duration, Utc};

use crate::event::Event;
use crate::time::TimeWindow;

/// How long before the start an alert is raised, in seconds.
pub const ALERT_LEAD_SECS: i64 = 60;

/// Allowed distance between an event start and `now + lead`, in milliseconds.
pub const MATCH_TOLERANCE_MS: i64 = 1_000;

/// The provider query window for a tick at `now`.
pub fn detection_window(now: DateTime<Utc>) -> TimeWindow {
    TimeWindow::from_duration(now + Duration::seconds(ALERT_LEAD_SECS), Duration::seconds(1))
}

/// Returns true if `event` starts close enough to `now + 60s` to alert on.
pub fn is_starting_soon(event: &Event, now: DateTime<Utc>) -> bool {
    let target = now + Duration::seconds(ALERT_LEAD_SECS);
    (event.start - target).num_milliseconds().abs() < MATCH_TOLERANCE_MS
}

/// Keeps the events that should be alerted on at `now`, in provider order.
pub fn filter_upcoming(now: DateTime<Utc>, events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|e| is_starting_soon(e, now))
        .collect()
}
