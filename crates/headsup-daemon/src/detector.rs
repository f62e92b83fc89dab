//! Upcoming-meeting detector.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use headsup_core::{Event, detection_window, filter_upcoming};
use headsup_providers::CalendarProvider;

/// Finds the events that start one minute after a tick.
#[derive(Clone)]
pub struct UpcomingDetector {
    provider: Arc<dyn CalendarProvider>,
}

impl UpcomingDetector {
    pub fn new(provider: Arc<dyn CalendarProvider>) -> Self {
        Self { provider }
    }

    /// Events starting within a second of `now + 60s`, in provider order.
    ///
    /// A provider failure is logged and yields no events.
    pub async fn check_upcoming(&self, now: DateTime<Utc>) -> Vec<Event> {
        let window = detection_window(now);
        let events = match self.provider.query_events(window).await {
            Ok(events) => events,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Detection query failed");
                return Vec::new();
            }
        };
        debug!(candidates = events.len(), "Detection window queried");

        let upcoming = filter_upcoming(now, events);
        for event in &upcoming {
            info!(event_id = %event.id, title = event.display_title(), start = %event.start, "Meeting starting in one minute");
        }
        upcoming
    }
}
