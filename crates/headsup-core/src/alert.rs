//! Alert content and the dismissal state machine.
//!
//! An alert is either visible or dismissed. Every way out of it (close button,
//! escape, a click outside the dialog, skip, join) is an [`AlertInput`] fed to
//! [`AlertSession::handle`], which transitions exactly once. Later inputs are
//! ignored, so whoever owns the countdown can stop it on the first
//! [`Dismissal`] without tracking which path got there.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::countdown::countdown_label;
use crate::event::{Event, NO_TITLE};
use crate::links::{self, MeetingService};

/// Notice title when join finds nothing to open.
pub const NO_LINK_TITLE: &str = "No Meeting Link Found";
/// Notice body when join finds nothing to open.
pub const NO_LINK_BODY: &str = "Could not find a meeting link in the event.";

/// Lifecycle of a single alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Visible,
    Dismissed,
}

/// A user action on a visible alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertInput {
    Close,
    Escape,
    OutsideClick,
    Skip,
    Join,
}

impl AlertInput {
    /// Maps a typed key to an input: `j`, `s`, `c`, the escape character or
    /// `esc` spelled out. Case and surrounding whitespace are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.eq_ignore_ascii_case("esc") || key == "\u{1b}" {
            return Some(Self::Escape);
        }
        match key {
            "j" | "J" => Some(Self::Join),
            "s" | "S" => Some(Self::Skip),
            "c" | "C" => Some(Self::Close),
            _ => None,
        }
    }
}

/// What the owner of an alert must do after it closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dismissal {
    /// Closed without joining.
    Closed(AlertInput),
    /// Open this link.
    Join(links::MeetingLink),
    /// Join was chosen but the event has no link; show the notice.
    NoLink,
}

/// One alert for one event.
#[derive(Debug, Clone)]
pub struct AlertSession {
    event: Event,
    state: AlertState,
}

impl AlertSession {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            state: AlertState::Visible,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == AlertState::Visible
    }

    /// Applies an input.
    ///
    /// Returns `None` when the alert was already dismissed.
    pub fn handle(&mut self, input: AlertInput) -> Option<Dismissal> {
        if self.state == AlertState::Dismissed {
            return None;
        }
        self.state = AlertState::Dismissed;

        let dismissal = match input {
            AlertInput::Join => match links::meeting_link(&self.event) {
                Some(link) => Dismissal::Join(link),
                None => Dismissal::NoLink,
            },
            other => Dismissal::Closed(other),
        };
        tracing::debug!(event_id = %self.event.id, ?input, "Alert dismissed");
        Some(dismissal)
    }
}

/// Everything an alert shows, apart from the live countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertContent {
    pub event_id: String,
    pub title: String,
    /// Local `HH:MM - HH:MM`.
    pub time_range: String,
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<MeetingService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
}

impl AlertContent {
    /// Builds the content in the local timezone.
    pub fn new(event: &Event) -> Self {
        Self::new_in(event, &Local, NO_TITLE)
    }

    /// Builds the content, formatting times in `tz`.
    pub fn new_in<Tz: TimeZone>(event: &Event, tz: &Tz, no_title: &str) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let link = links::meeting_link(event);
        Self {
            event_id: event.id.clone(),
            title: event.display_title_or(no_title).to_string(),
            time_range: format!(
                "{} - {}",
                event.start.with_timezone(tz).format("%H:%M"),
                event.end.with_timezone(tz).format("%H:%M")
            ),
            start: event.start,
            service: link.as_ref().map(|l| l.service),
            link: link.map(|l| l.url),
        }
    }

    /// The countdown line at `now`.
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        countdown_label(self.start, now)
    }

    /// Notification body: time range, countdown, and the service when known.
    pub fn body(&self, now: DateTime<Utc>) -> String {
        let mut body = format!("{}\n{}", self.time_range, self.countdown(now));
        if let Some(service) = self.service {
            body.push_str(&format!("\nJoin via {service}"));
        }
        body
    }

    /// Full terminal view, with the key hints.
    pub fn render(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}\n{}\n\n[j] Join  [s] Skip  [c] Close  [Esc] Dismiss",
            self.title,
            self.body(now)
        )
    }
}
