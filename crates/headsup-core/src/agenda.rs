//! Agenda: upcoming events grouped by local day.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::event::{Event, NO_TITLE, sort_by_start};
use crate::settings::Settings;
use crate::time::{self, TimeWindow};

/// Shown when there is nothing left to list.
pub const NO_MORE_EVENTS: &str = "No more events";

/// The provider window for the agenda at `now`.
///
/// Seven days from `now`, or from local midnight when today's finished events
/// should be listed too.
pub fn agenda_window<Tz: TimeZone>(now: DateTime<Utc>, settings: &Settings, tz: &Tz) -> TimeWindow {
    let start = if settings.show_past_events_for_today {
        time::start_of_day(now, tz)
    } else {
        now
    };
    TimeWindow::new(start, now + chrono::Duration::days(time::LOOKAHEAD_DAYS))
}

/// Events keyed by the local day they start on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventsByDay {
    days: BTreeMap<NaiveDate, Vec<Event>>,
}

/// Rendering knobs for [`EventsByDay::render`].
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub no_title: &'a str,
    /// Append the event id, so it can be passed to `headsup alert`.
    pub show_ids: bool,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            no_title: NO_TITLE,
            show_ids: false,
        }
    }
}

impl EventsByDay {
    /// Groups `events` by local start day, each day sorted by start.
    ///
    /// Events that ended before `now` are dropped unless `settings` asks for
    /// today's past events.
    pub fn build<Tz: TimeZone>(
        now: DateTime<Utc>,
        events: Vec<Event>,
        settings: &Settings,
        tz: &Tz,
    ) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
        for event in events {
            if !settings.show_past_events_for_today && event.has_ended_at(now) {
                continue;
            }
            days.entry(event.start_day(tz)).or_default().push(event);
        }
        for events in days.values_mut() {
            sort_by_start(events);
        }
        Self { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in ascending order.
    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &[Event])> {
        self.days.iter().map(|(d, e)| (d, e.as_slice()))
    }

    /// All events, day by day.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.days.values().flatten()
    }

    /// Looks up an event by id.
    pub fn find(&self, id: &str) -> Option<&Event> {
        self.events().find(|e| e.id == id)
    }

    /// Renders the agenda as text, times in `tz`.
    pub fn render<Tz: TimeZone>(&self, tz: &Tz, options: &RenderOptions<'_>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        if self.is_empty() {
            return format!("{NO_MORE_EVENTS}\n");
        }

        let mut out = String::new();
        for (day, events) in &self.days {
            let _ = writeln!(out, "{}", day.format("%A, %B %-d, %Y"));
            for event in events {
                let _ = write!(
                    out,
                    "{} - {}",
                    event.start.with_timezone(tz).format("%H:%M"),
                    event.display_title_or(options.no_title)
                );
                if options.show_ids {
                    let _ = write!(out, "  [{}]", event.id);
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}
