//! Meeting link extraction.
//!
//! A join link is resolved from an [`Event`] in two steps:
//! 1. The event's own URL, when it parses, wins outright.
//! 2. Otherwise the notes are scanned against an ordered list of
//!    per-service patterns. The first *pattern* that matches anywhere decides,
//!    and its first occurrence is returned. A Meet link appearing earlier in the
//!    text than a Zoom link still loses to Zoom, because Zoom is checked first.
//!
//! Matching is case-insensitive. A rule whose pattern does not compile is
//! dropped with a warning and the remaining rules still apply.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use headsup_core::{Event, extract_link};
//!
//! let start = Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap();
//! let event = Event::new("evt", start, start)
//!     .with_notes("Join: https://company.zoom.us/j/123456789?pwd=abc");
//! let link = extract_link(&event).unwrap();
//! assert_eq!(link.as_str(), "https://company.zoom.us/j/123456789?pwd=abc");
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::event::Event;

/// Video conferencing services recognised in event notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingService {
    Zoom,
    GoogleMeet,
    Teams,
    Webex,
    GoToMeeting,
    GoToWebinar,
    BlueJeans,
    Chime,
    RingCentral,
    JoinMe,
    Cisco,
    EightByEight,
    /// The link came from the event's own URL field.
    EventUrl,
}

impl MeetingService {
    /// Returns a human-readable name for this service.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Zoom => "Zoom",
            Self::GoogleMeet => "Google Meet",
            Self::Teams => "Microsoft Teams",
            Self::Webex => "Cisco Webex",
            Self::GoToMeeting => "GoToMeeting",
            Self::GoToWebinar => "GoToWebinar",
            Self::BlueJeans => "BlueJeans",
            Self::Chime => "Amazon Chime",
            Self::RingCentral => "RingCentral",
            Self::JoinMe => "Join.me",
            Self::Cisco => "Cisco",
            Self::EightByEight => "8x8",
            Self::EventUrl => "Link",
        }
    }
}

impl fmt::Display for MeetingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The ordered rule list. Order is priority.
pub const DEFAULT_RULES: &[(MeetingService, &str)] = &[
    (
        MeetingService::Zoom,
        r"https?://[a-zA-Z0-9./?&=-]*zoom\.us/[a-zA-Z0-9./?&=-]+",
    ),
    (
        MeetingService::GoogleMeet,
        r"https?://meet\.google\.com/[a-zA-Z0-9?&=-]+",
    ),
    (
        MeetingService::Teams,
        r"https?://teams\.microsoft\.com/l/meetup-join/[a-zA-Z0-9?&=-]+",
    ),
    (
        MeetingService::Webex,
        r"https?://[a-zA-Z0-9./?&=-]*webex\.com/[a-zA-Z0-9./?&=-]+",
    ),
    (
        MeetingService::GoToMeeting,
        r"https?://[a-zA-Z0-9./?&=-]*gotomeeting\.com/join/[a-zA-Z0-9?&=-]+",
    ),
    (
        MeetingService::GoToWebinar,
        r"https?://[a-zA-Z0-9./?&=-]*gotowebinar\.com/join/[a-zA-Z0-9?&=-]+",
    ),
    (
        MeetingService::BlueJeans,
        r"https?://[a-zA-Z0-9./?&=-]*bluejeans\.com/[a-zA-Z0-9?&=-]+",
    ),
    (
        MeetingService::Chime,
        r"https?://[a-zA-Z0-9./?&=-]*chime\.aws/[a-zA-Z0-9?&=-]+",
    ),
    (
        MeetingService::RingCentral,
        r"https?://[a-zA-Z0-9./?&=-]*ringcentral\.com/[a-zA-Z0-9./?&=-]+",
    ),
    (
        MeetingService::JoinMe,
        r"https?://[a-zA-Z0-9./?&=-]*join\.me/[a-zA-Z0-9./?&=-]+",
    ),
    (
        MeetingService::Cisco,
        r"https?://[a-zA-Z0-9./?&=-]*cisco\.com/[a-zA-Z0-9./?&=-]+",
    ),
    (
        MeetingService::EightByEight,
        r"https?://[a-zA-Z0-9./?&=-]*8x8\.vc/[a-zA-Z0-9./?&=-]+",
    ),
];

static DEFAULT_EXTRACTOR: LazyLock<LinkExtractor> =
    LazyLock::new(|| LinkExtractor::from_rules(DEFAULT_RULES));

/// A resolved join link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingLink {
    /// The link to open.
    pub url: Url,
    /// Which rule produced it.
    pub service: MeetingService,
}

#[derive(Debug)]
struct LinkRule {
    service: MeetingService,
    regex: Regex,
}

/// Ordered, case-insensitive meeting link matcher.
#[derive(Debug)]
pub struct LinkExtractor {
    rules: Vec<LinkRule>,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::from_rules(DEFAULT_RULES)
    }
}

impl LinkExtractor {
    /// Compiles the given rules, in order.
    ///
    /// Rules whose pattern fails to compile are skipped.
    pub fn from_rules(rules: &[(MeetingService, &str)]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|&(service, pattern)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(LinkRule { service, regex }),
                    Err(e) => {
                        warn!(%service, pattern, error = %e, "Invalid link pattern, skipping");
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Number of usable rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Resolves the join link for an event.
    pub fn meeting_link(&self, event: &Event) -> Option<MeetingLink> {
        if let Some(url) = event.url.as_deref().and_then(|u| Url::parse(u.trim()).ok()) {
            return Some(MeetingLink {
                url,
                service: MeetingService::EventUrl,
            });
        }

        let notes = event.notes.as_deref()?;
        let link = self.scan(notes);
        if link.is_none() {
            debug!(event_id = %event.id, "No meeting link in notes");
        }
        link
    }

    /// Scans free text with the ordered rules.
    pub fn scan(&self, text: &str) -> Option<MeetingLink> {
        self.rules.iter().find_map(|rule| {
            let found = rule.regex.find(text)?;
            // An unparseable match is treated like no match for this rule.
            let url = Url::parse(found.as_str()).ok()?;
            Some(MeetingLink {
                url,
                service: rule.service,
            })
        })
    }
}

/// Returns the join URL for an event using the built-in rules.
pub fn extract_link(event: &Event) -> Option<Url> {
    meeting_link(event).map(|link| link.url)
}

/// Returns the join link, with the matching service, using the built-in rules.
pub fn meeting_link(event: &Event) -> Option<MeetingLink> {
    DEFAULT_EXTRACTOR.meeting_link(event)
}
