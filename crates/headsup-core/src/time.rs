//! Time windows used to query calendar providers.
//!
//! [`TimeWindow`] is a half-open `[start, end)` interval in UTC. The helper
//! constructors build the two windows the application actually asks for: the
//! one-second detection slot a minute ahead, and the seven-day lookahead used by
//! the status summary and the agenda.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How far ahead the summary and the agenda look.
pub const LOOKAHEAD_DAYS: i64 = 7;

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a time window from a start time and duration.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// The seven-day window starting at `start`.
    pub fn lookahead(start: DateTime<Utc>) -> Self {
        Self::from_duration(start, Duration::days(LOOKAHEAD_DAYS))
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if an event with the given bounds overlaps this window.
    ///
    /// An event overlaps if it starts before the window ends and either ends
    /// after the window starts or starts inside it. The second clause keeps
    /// zero-length events that sit exactly on the window start.
    pub fn overlaps(&self, event_start: DateTime<Utc>, event_end: DateTime<Utc>) -> bool {
        event_start < self.end && (event_end > self.start || self.contains(event_start))
    }
}

/// Returns the UTC instant of local midnight for the day containing `now`.
///
/// Falls back to `now` itself on the rare days where local midnight does not
/// exist (DST transitions at 00:00).
pub fn start_of_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let day = now.with_timezone(tz).date_naive();
    local_midnight(day, tz).unwrap_or(now)
}

/// Returns the UTC instant of local midnight on `day`, if it exists.
pub fn local_midnight<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns the local calendar day of `now`.
pub fn today<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let start = utc(2026, 10, 16, 9, 0, 0);
            let end = utc(2026, 10, 16, 17, 0, 0);
            let window = TimeWindow::new(start, end);
            assert_eq!(window.start, start);
            assert_eq!(window.end, end);
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2026, 10, 16, 17, 0, 0), utc(2026, 10, 16, 9, 0, 0));
        }

        #[test]
        fn lookahead_is_seven_days() {
            let now = utc(2026, 10, 16, 12, 0, 0);
            let window = TimeWindow::lookahead(now);
            assert_eq!(window.end, utc(2026, 10, 23, 12, 0, 0));
        }

        #[test]
        fn contains_is_half_open() {
            let window = TimeWindow::new(utc(2026, 10, 16, 9, 0, 0), utc(2026, 10, 16, 17, 0, 0));
            assert!(window.contains(utc(2026, 10, 16, 9, 0, 0)));
            assert!(window.contains(utc(2026, 10, 16, 16, 59, 59)));
            assert!(!window.contains(utc(2026, 10, 16, 17, 0, 0)));
            assert!(!window.contains(utc(2026, 10, 16, 8, 59, 59)));
        }

        #[test]
        fn overlaps() {
            let window = TimeWindow::new(utc(2026, 10, 16, 9, 0, 0), utc(2026, 10, 16, 17, 0, 0));

            // inside
            assert!(window.overlaps(utc(2026, 10, 16, 10, 0, 0), utc(2026, 10, 16, 11, 0, 0)));
            // straddles start
            assert!(window.overlaps(utc(2026, 10, 16, 8, 0, 0), utc(2026, 10, 16, 10, 0, 0)));
            // contains the window
            assert!(window.overlaps(utc(2026, 10, 16, 8, 0, 0), utc(2026, 10, 16, 18, 0, 0)));
            // ends at window start
            assert!(!window.overlaps(utc(2026, 10, 16, 8, 0, 0), utc(2026, 10, 16, 9, 0, 0)));
            // starts at window end
            assert!(!window.overlaps(utc(2026, 10, 16, 17, 0, 0), utc(2026, 10, 16, 18, 0, 0)));
        }

        #[test]
        fn zero_length_event_on_window_start_overlaps() {
            let at = utc(2026, 10, 16, 10, 1, 0);
            let window = TimeWindow::from_duration(at, Duration::seconds(1));
            assert!(window.overlaps(at, at));
        }
    }

    mod days {
        use super::*;

        #[test]
        fn start_of_day_in_utc() {
            let now = utc(2026, 10, 16, 15, 42, 7);
            assert_eq!(start_of_day(now, &Utc), utc(2026, 10, 16, 0, 0, 0));
        }

        #[test]
        fn start_of_day_with_offset() {
            // 01:00 UTC is 03:00 at +02:00, local midnight is 22:00 UTC the day before.
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            let now = utc(2026, 10, 16, 1, 0, 0);
            assert_eq!(start_of_day(now, &tz), utc(2026, 10, 15, 22, 0, 0));
        }

        #[test]
        fn today_uses_local_date() {
            let tz = FixedOffset::west_opt(5 * 3600).unwrap();
            let now = utc(2026, 10, 16, 2, 0, 0);
            assert_eq!(today(now, &tz), NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        }
    }
}
