//! [`CalendarProvider`] over an ICS file or feed.

use std::time::Duration;

use chrono::{Local, Utc};
use chrono_tz::Tz as NamedTz;
use tracing::{debug, info, warn};

use headsup_core::{Event, TimeWindow};

use super::parse::parse_ics;
use super::source::{DEFAULT_TIMEOUT, IcsFetcher, IcsSource};
use crate::error::ProviderResult;
use crate::provider::{AccessStatus, BoxFuture, CalendarProvider, select_window};

/// Reads events from an iCalendar source on every query.
#[derive(Debug)]
pub struct IcsProvider {
    name: String,
    source: IcsSource,
    fetcher: IcsFetcher,
    /// Zone for floating times and all-day dates; the system zone when unset.
    timezone: Option<NamedTz>,
}

impl IcsProvider {
    pub fn new(source: IcsSource) -> ProviderResult<Self> {
        Self::with_timeout(source, DEFAULT_TIMEOUT)
    }

    /// Creates a provider whose feed requests give up after `timeout`.
    pub fn with_timeout(source: IcsSource, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            name: "ics".to_string(),
            source,
            fetcher: IcsFetcher::new(timeout)?,
            timezone: None,
        })
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method to pin the zone used for floating times.
    pub fn with_timezone(mut self, timezone: NamedTz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn source(&self) -> &IcsSource {
        &self.source
    }

    /// Fetches and parses the calendar, expanding series within `window`.
    async fn load(&self, window: &TimeWindow) -> ProviderResult<Vec<Event>> {
        let text = self
            .fetcher
            .fetch(&self.source)
            .await
            .map_err(|e| e.with_provider(&self.name))?;
        let events = match self.timezone {
            Some(tz) => parse_ics(&text, &tz, window),
            None => parse_ics(&text, &Local, window),
        }
        .map_err(|e| e.with_provider(&self.name))?;
        debug!(source = %self.source, count = events.len(), "Loaded calendar");
        Ok(events)
    }
}

impl CalendarProvider for IcsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_access(&self) -> BoxFuture<'_, AccessStatus> {
        Box::pin(async move {
            match self.load(&TimeWindow::lookahead(Utc::now())).await {
                Ok(_) => {
                    info!(source = %self.source, "Calendar access granted");
                    AccessStatus::Granted
                }
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Calendar unreachable, continuing");
                    AccessStatus::Granted
                }
                Err(e) => AccessStatus::Denied(e.to_string()),
            }
        })
    }

    fn query_events(&self, window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        Box::pin(async move {
            let events = self.load(&window).await?;
            Ok(select_window(events, &window))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        PRODID:-//headsup//test//EN\r\n\
        BEGIN:VEVENT\r\n\
        UID:review\r\n\
        DTSTART:20261016T140000Z\r\n\
        DTEND:20261016T150000Z\r\n\
        SUMMARY:Design Review\r\n\
        END:VEVENT\r\n\
        BEGIN:VEVENT\r\n\
        UID:standup\r\n\
        DTSTART:20261016T100000Z\r\n\
        DTEND:20261016T101500Z\r\n\
        SUMMARY:Standup\r\n\
        DESCRIPTION:https://meet.google.com/abc-defg-hij\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, h, m, 0).unwrap()
    }

    fn provider_for(dir: &tempfile::TempDir, body: &str) -> IcsProvider {
        let path = dir.path().join("work.ics");
        std::fs::write(&path, body).unwrap();
        IcsProvider::new(IcsSource::File(path))
            .unwrap()
            .with_timezone(chrono_tz::UTC)
    }

    #[tokio::test]
    async fn queries_window_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, FEED);
        let events = provider
            .query_events(TimeWindow::lookahead(at(9, 0)))
            .await
            .unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["standup", "review"]);
    }

    #[tokio::test]
    async fn detection_slot_finds_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, FEED);
        let window = TimeWindow::from_duration(at(10, 0), Duration::seconds(1));
        let events = provider.query_events(window).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "standup");
    }

    #[tokio::test]
    async fn access_granted_for_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, FEED).with_name("work");
        assert_eq!(provider.name(), "work");
        assert!(provider.request_access().await.is_granted());
    }

    #[tokio::test]
    async fn access_denied_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = IcsProvider::new(IcsSource::File(dir.path().join("nope.ics"))).unwrap();
        match provider.request_access().await {
            AccessStatus::Denied(reason) => assert!(reason.contains("access_denied")),
            AccessStatus::Granted => panic!("missing file should deny access"),
        }
    }

    #[tokio::test]
    async fn recurring_event_is_found_weeks_later() {
        let dir = tempfile::tempdir().unwrap();
        let weekly = FEED.replace(
            "DTSTART:20261016T100000Z\r\n",
            "DTSTART:20261002T100000Z\r\nRRULE:FREQ=WEEKLY\r\n",
        );
        let provider = provider_for(&dir, &weekly);
        let window = TimeWindow::from_duration(at(10, 0), Duration::seconds(1));
        let events = provider.query_events(window).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["standup@20261016T100000Z"]);
    }
}
