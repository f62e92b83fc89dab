//! Core logic: events, link extraction, detection, summaries, alerts, settings

pub mod agenda;
pub mod alert;
pub mod countdown;
pub mod detect;
pub mod event;
pub mod links;
pub mod settings;
pub mod summary;
pub mod time;
pub mod tracing;

pub use agenda::{EventsByDay, NO_MORE_EVENTS, RenderOptions, agenda_window};
pub use alert::{
    AlertContent, AlertInput, AlertSession, AlertState, Dismissal, NO_LINK_BODY, NO_LINK_TITLE,
};
pub use countdown::{countdown_label, format_hms};
pub use detect::{ALERT_LEAD_SECS, detection_window, filter_upcoming, is_starting_soon};
pub use event::{Event, NO_TITLE, sort_by_start};
pub use links::{LinkExtractor, MeetingLink, MeetingService, extract_link, meeting_link};
pub use settings::{
    MemorySettingsStore, SettingKey, Settings, SettingsError, SettingsResult, SettingsStore,
    parse_bool,
};
pub use summary::{
    DisplayState, StatusIcon, StatusReport, format_remaining, select_next_event, summarize,
    summarize_in, truncate_title,
};
pub use time::{LOOKAHEAD_DAYS, TimeWindow};
pub use tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
