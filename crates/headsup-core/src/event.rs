//! Calendar event snapshot.
//!
//! An [`Event`] is an immutable snapshot handed out by a calendar provider for
//! one query. Nothing in the application mutates it after the fetch; whoever
//! queried it owns it until the tick (or command) is done with it.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Title shown when an event has none.
pub const NO_TITLE: &str = "No Title";

/// A calendar event as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque provider identifier.
    pub id: String,
    /// The event title, if the calendar has one.
    pub title: Option<String>,
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// When the event ends.
    pub end: DateTime<Utc>,
    /// Explicit URL attached to the event.
    pub url: Option<String>,
    /// Free-form notes (description) of the event.
    pub notes: Option<String>,
}

impl Event {
    /// Creates an event with the required fields.
    pub fn new(id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: None,
            start,
            end,
            url: None,
            notes: None,
        }
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder method to set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the title, or [`NO_TITLE`] when the event has none.
    pub fn display_title(&self) -> &str {
        self.display_title_or(NO_TITLE)
    }

    /// Returns the title, or `fallback` when the event has none.
    pub fn display_title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }

    /// Returns true if `now` falls inside `[start, end]`.
    ///
    /// Both bounds are inclusive: an event is still shown as running at the
    /// exact second it ends.
    pub fn is_in_progress_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// Returns true if the event ended before `now`.
    pub fn has_ended_at(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }

    /// The local calendar day the event starts on.
    pub fn start_day<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.start.with_timezone(tz).date_naive()
    }

    /// Length of the event.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Sorts events by start time, keeping provider order for equal starts.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by_key(|e| e.start);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn sample() -> Event {
        Event::new(
            "evt-1",
            utc(2026, 10, 16, 10, 0, 0),
            utc(2026, 10, 16, 10, 30, 0),
        )
        .with_title("Team Standup")
    }

    #[test]
    fn builder_sets_fields() {
        let event = sample()
            .with_url("https://zoom.us/j/1")
            .with_notes("agenda");
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.title.as_deref(), Some("Team Standup"));
        assert_eq!(event.url.as_deref(), Some("https://zoom.us/j/1"));
        assert_eq!(event.notes.as_deref(), Some("agenda"));
        assert_eq!(event.duration(), Duration::minutes(30));
    }

    #[test]
    fn display_title_falls_back() {
        let event = Event::new("x", utc(2026, 1, 1, 0, 0, 0), utc(2026, 1, 1, 1, 0, 0));
        assert_eq!(event.display_title(), NO_TITLE);
        assert_eq!(sample().display_title(), "Team Standup");
    }

    #[test]
    fn in_progress_bounds_are_inclusive() {
        let event = sample();
        assert!(!event.is_in_progress_at(utc(2026, 10, 16, 9, 59, 59)));
        assert!(event.is_in_progress_at(utc(2026, 10, 16, 10, 0, 0)));
        assert!(event.is_in_progress_at(utc(2026, 10, 16, 10, 30, 0)));
        assert!(!event.is_in_progress_at(utc(2026, 10, 16, 10, 30, 1)));
        assert!(event.has_ended_at(utc(2026, 10, 16, 10, 30, 1)));
    }

    #[test]
    fn start_day_respects_timezone() {
        let event = Event::new(
            "late",
            utc(2026, 10, 16, 23, 30, 0),
            utc(2026, 10, 17, 0, 30, 0),
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            event.start_day(&Utc),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
        assert_eq!(
            event.start_day(&plus_two),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
    }

    #[test]
    fn sort_is_stable_by_start() {
        let a = Event::new("a", utc(2026, 1, 1, 10, 0, 0), utc(2026, 1, 1, 11, 0, 0));
        let b = Event::new("b", utc(2026, 1, 1, 9, 0, 0), utc(2026, 1, 1, 9, 30, 0));
        let c = Event::new("c", utc(2026, 1, 1, 10, 0, 0), utc(2026, 1, 1, 10, 15, 0));
        let mut events = vec![a, b, c];
        sort_by_start(&mut events);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn serde_roundtrip() {
        let event = sample().with_url("https://meet.google.com/abc-defg-hij");
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
