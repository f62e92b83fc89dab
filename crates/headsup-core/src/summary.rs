//! Next-event summary for the status display.
//!
//! Once a minute the status display shows either the running meeting and how
//! long it has left, the next meeting and how long until it starts, or nothing
//! but a calendar icon.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::event::{Event, NO_TITLE};
use crate::settings::Settings;
use crate::time;

/// Titles longer than this many user-perceived characters (grapheme
/// clusters) are truncated in the status label.
pub const MAX_TITLE_CHARS: usize = 10;

/// What the status display should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// A meeting is running; `remaining` is the time until it ends.
    InProgress {
        title: Option<String>,
        remaining: Duration,
    },
    /// The next meeting has not started; `remaining` is the time until it does.
    Upcoming {
        title: Option<String>,
        remaining: Duration,
    },
    /// Nothing to show.
    Idle,
}

/// Icon shown next to the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    None,
    Calendar,
}

impl StatusIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Calendar => "📅",
        }
    }
}

impl DisplayState {
    /// Status label using [`NO_TITLE`] for untitled events.
    pub fn label(&self) -> String {
        self.label_with(NO_TITLE)
    }

    /// Status label using `no_title` for untitled events.
    pub fn label_with(&self, no_title: &str) -> String {
        match self {
            Self::InProgress { title, remaining } => format!(
                "{} ends in {}",
                truncate_title(title.as_deref().unwrap_or(no_title)),
                format_remaining(*remaining)
            ),
            Self::Upcoming { title, remaining } => format!(
                "{} in {}",
                truncate_title(title.as_deref().unwrap_or(no_title)),
                format_remaining(*remaining)
            ),
            Self::Idle => String::new(),
        }
    }

    pub fn icon(&self) -> StatusIcon {
        match self {
            Self::Idle => StatusIcon::Calendar,
            _ => StatusIcon::None,
        }
    }

    /// A serializable view for `--json` output.
    pub fn report(&self, no_title: &str) -> StatusReport {
        let (state, title, remaining) = match self {
            Self::InProgress { title, remaining } => ("in_progress", title.clone(), Some(remaining)),
            Self::Upcoming { title, remaining } => ("upcoming", title.clone(), Some(remaining)),
            Self::Idle => ("idle", None, None),
        };
        StatusReport {
            state: state.to_string(),
            title,
            remaining_seconds: remaining.map(|r| r.num_seconds().max(0)),
            label: self.label_with(no_title),
            icon: self.icon(),
        }
    }
}

/// JSON shape of a [`DisplayState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    pub label: String,
    pub icon: StatusIcon,
}

/// Picks the event to summarize from a list sorted by start.
///
/// The first event that is running at `now` or starts at or after `now`.
/// Finished events are skipped. A running event always sorts before any
/// event that has yet to start, so it wins.
pub fn select_next_event(now: DateTime<Utc>, events: &[Event]) -> Option<&Event> {
    events
        .iter()
        .find(|e| e.is_in_progress_at(now) || e.start >= now)
}

/// Summarizes `events` in the local timezone.
pub fn summarize(now: DateTime<Utc>, events: &[Event], settings: &Settings) -> DisplayState {
    summarize_in(now, events, settings, &Local)
}

/// Summarizes `events`, comparing calendar days in `tz`.
///
/// `events` must be sorted by start.
pub fn summarize_in<Tz: TimeZone>(
    now: DateTime<Utc>,
    events: &[Event],
    settings: &Settings,
    tz: &Tz,
) -> DisplayState {
    let Some(event) = select_next_event(now, events) else {
        return DisplayState::Idle;
    };

    if !settings.always_show_next_event && event.start_day(tz) != time::today(now, tz) {
        return DisplayState::Idle;
    }

    let title = event.title.clone();
    if event.is_in_progress_at(now) {
        DisplayState::InProgress {
            title,
            remaining: event.end - now,
        }
    } else {
        DisplayState::Upcoming {
            title,
            remaining: event.start - now,
        }
    }
}

/// Shortens titles longer than [`MAX_TITLE_CHARS`] to nine graphemes and `…`.
pub fn truncate_title(title: &str) -> String {
    if title.graphemes(true).count() > MAX_TITLE_CHARS {
        let head: String = title.graphemes(true).take(MAX_TITLE_CHARS - 1).collect();
        format!("{head}…")
    } else {
        title.to_string()
    }
}

/// Formats a duration as `"{h}h {m}m"`, or `"{m}m"` under an hour.
///
/// Seconds are truncated and negative durations read as zero.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
