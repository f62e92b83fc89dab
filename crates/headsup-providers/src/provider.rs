//! The [`CalendarProvider`] seam and the in-process providers.
//!
//! A provider answers two questions: may we read the calendar at all, and
//! which events overlap a given window. Everything else (polling cadence,
//! filtering, formatting) happens above it.

use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use headsup_core::{Event, TimeWindow, sort_by_start};
use serde::Serialize;

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of an access request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AccessStatus {
    Granted,
    /// Access was refused; the reason is shown to the user.
    Denied(String),
}

impl AccessStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// A source of calendar events.
///
/// Implementations must be `Send + Sync`; the daemon holds one behind an
/// `Arc` for its whole lifetime.
pub trait CalendarProvider: Send + Sync {
    /// Short identifier used in logs and errors (e.g. "ics").
    fn name(&self) -> &str;

    /// Asks for permission to read the calendar.
    ///
    /// Called once at startup. `Denied` is final.
    fn request_access(&self) -> BoxFuture<'_, AccessStatus>;

    /// Returns the events overlapping `window`, sorted by start.
    fn query_events(&self, window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<Event>>>;
}

/// Keeps the events overlapping `window` and sorts them by start.
pub fn select_window(events: impl IntoIterator<Item = Event>, window: &TimeWindow) -> Vec<Event> {
    let mut events: Vec<Event> = events
        .into_iter()
        .filter(|e| window.overlaps(e.start, e.end))
        .collect();
    sort_by_start(&mut events);
    events
}

/// A provider backed by a fixed list of events.
#[derive(Debug, Default)]
pub struct StaticProvider {
    events: RwLock<Vec<Event>>,
}

impl StaticProvider {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Replaces the event list.
    pub fn set_events(&self, events: Vec<Event>) {
        if let Ok(mut guard) = self.events.write() {
            *guard = events;
        }
    }
}

impl CalendarProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn request_access(&self) -> BoxFuture<'_, AccessStatus> {
        Box::pin(async { AccessStatus::Granted })
    }

    fn query_events(&self, window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        let result = self
            .events
            .read()
            .map(|events| select_window(events.iter().cloned(), &window))
            .map_err(|_| ProviderError::internal("event list lock poisoned").with_provider("static"));
        Box::pin(async move { result })
    }
}

/// A provider that refuses access and fails every query.
///
/// Stands in when no calendar source is configured or the configured one
/// cannot be built.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl CalendarProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_access(&self) -> BoxFuture<'_, AccessStatus> {
        let reason = self.error.message().to_string();
        Box::pin(async move { AccessStatus::Denied(reason) })
    }

    fn query_events(&self, _window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}
