//! Application context and the alert loop.
//!
//! [`AppContext`] is built once and owns everything a tick touches: the
//! provider, the settings store, the status display and the alert controller.
//! [`AppContext::run`] asks for calendar access, then multiplexes the minute
//! tick, alert inputs and shutdown on one task.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};
use tokio::sync::mpsc;
use tracing::{Instrument, debug_span, info, warn};

use headsup_core::{
    AlertInput, DisplayState, Dismissal, Event, EventsByDay, NO_TITLE, Settings, SettingsStore,
    TimeWindow, agenda_window, summarize, time,
};
use headsup_providers::{AccessStatus, CalendarProvider};

use crate::controller::AlertController;
use crate::detector::UpcomingDetector;
use crate::error::{DaemonError, DaemonResult};
use crate::seams::{AlertPresenter, LinkOpener, NoticeSink, StatusDisplay};
use crate::signals::Shutdown;
use crate::ticker::{Clock, MinuteTicker};

/// Title of the notice shown when the calendar cannot be read.
pub const ACCESS_REQUIRED_TITLE: &str = "Calendar Access Required";
/// Body of the notice shown when the calendar cannot be read.
pub const ACCESS_REQUIRED_BODY: &str = "headsup needs access to your calendar to display upcoming meetings. \
     Set `source` under [calendar] in config.toml to a readable .ics file or feed URL.";

/// Where the daemon's output goes.
#[derive(Clone)]
pub struct Outputs {
    pub status: Arc<dyn StatusDisplay>,
    pub presenter: Arc<dyn AlertPresenter>,
    pub opener: Arc<dyn LinkOpener>,
    pub notices: Arc<dyn NoticeSink>,
}

/// Everything one tick needs.
pub struct AppContext {
    provider: Arc<dyn CalendarProvider>,
    settings: Arc<dyn SettingsStore>,
    status: Arc<dyn StatusDisplay>,
    notices: Arc<dyn NoticeSink>,
    detector: UpcomingDetector,
    alerts: AlertController,
    clock: Arc<dyn Clock>,
    no_title: String,
}

impl AppContext {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        settings: Arc<dyn SettingsStore>,
        outputs: Outputs,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let alerts = AlertController::new(
            outputs.presenter,
            outputs.opener,
            outputs.notices.clone(),
            clock.clone(),
        );
        Self {
            detector: UpcomingDetector::new(provider.clone()),
            provider,
            settings,
            status: outputs.status,
            notices: outputs.notices,
            alerts,
            clock,
            no_title: NO_TITLE.to_string(),
        }
    }

    /// Builder method to set the placeholder for untitled events.
    pub fn with_no_title(mut self, no_title: impl Into<String>) -> Self {
        self.no_title = no_title.into();
        self.alerts = self.alerts.with_no_title(self.no_title.clone());
        self
    }

    /// Placeholder shown for untitled events.
    pub fn no_title(&self) -> &str {
        &self.no_title
    }

    pub fn provider(&self) -> &dyn CalendarProvider {
        self.provider.as_ref()
    }

    pub fn alerts(&self) -> &AlertController {
        &self.alerts
    }

    /// Reads the current toggles from the store.
    pub fn settings(&self) -> Settings {
        Settings::load(self.settings.as_ref())
    }

    /// Requests calendar access. On denial, shows the access notice and fails.
    pub async fn request_access(&self) -> DaemonResult<()> {
        match self.provider.request_access().await {
            AccessStatus::Granted => Ok(()),
            AccessStatus::Denied(reason) => {
                warn!(provider = self.provider.name(), %reason, "Calendar access denied");
                self.notices
                    .notice(ACCESS_REQUIRED_TITLE, &format!("{ACCESS_REQUIRED_BODY}\n\n{reason}"));
                Err(DaemonError::access_denied(reason))
            }
        }
    }

    /// One minute tick: alert on meetings starting in a minute, then refresh
    /// the status display.
    pub async fn tick(&mut self) {
        let now = self.clock.now();
        async {
            for event in self.detector.check_upcoming(now).await {
                self.alerts.present(event);
            }

            let state = match self.next_event_state(now).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Summary query failed");
                    DisplayState::Idle
                }
            };
            self.status.update(&state.label_with(&self.no_title), state.icon());
        }
        .instrument(debug_span!("tick", %now))
        .await
    }

    /// The status display state at `now`.
    pub async fn next_event_state(&self, now: DateTime<Utc>) -> DaemonResult<DisplayState> {
        let events = self.provider.query_events(TimeWindow::lookahead(now)).await?;
        Ok(summarize(now, &events, &self.settings()))
    }

    /// Upcoming events grouped by local day.
    pub async fn fetch_agenda(&self, now: DateTime<Utc>) -> DaemonResult<EventsByDay> {
        let settings = self.settings();
        let window = agenda_window(now, &settings, &Local);
        let events = self.provider.query_events(window).await?;
        Ok(EventsByDay::build(now, events, &settings, &Local))
    }

    /// Looks up an event by id, from the start of today through the lookahead.
    pub async fn find_event(&self, now: DateTime<Utc>, id: &str) -> DaemonResult<Option<Event>> {
        let window = TimeWindow::new(
            time::start_of_day(now, &Local),
            now + Duration::days(time::LOOKAHEAD_DAYS),
        );
        let events = self.provider.query_events(window).await?;
        Ok(events.into_iter().find(|e| e.id == id))
    }

    /// Shows an alert for `event` and waits until it is dismissed.
    ///
    /// Returns `None` if the input channel closes first.
    pub async fn run_alert(
        &mut self,
        event: Event,
        inputs: &mut mpsc::Receiver<AlertInput>,
    ) -> Option<Dismissal> {
        self.alerts.present(event);
        while let Some(input) = inputs.recv().await {
            if let Some(dismissal) = self.alerts.handle(input) {
                return Some(dismissal);
            }
        }
        self.alerts.dismiss_all();
        None
    }

    /// Runs until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::AccessDenied`] if the calendar refuses access.
    pub async fn run(
        mut self,
        mut inputs: mpsc::Receiver<AlertInput>,
        shutdown: Shutdown,
    ) -> DaemonResult<()> {
        self.request_access().await?;

        let mut ticker = MinuteTicker::new(self.clock.clone());
        info!(provider = self.provider.name(), "Alert loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                Some(input) = inputs.recv() => {
                    if self.alerts.handle(input).is_none() {
                        info!(?input, "No visible alert");
                    }
                }
                _ = shutdown.wait() => break,
            }
        }

        self.alerts.dismiss_all();
        info!("Alert loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seams::recording::{Call, Recorder};
    use crate::ticker::manual::ManualClock;
    use chrono::TimeZone;
    use headsup_core::{MemorySettingsStore, SettingKey, StatusIcon};
    use headsup_providers::{ErrorProvider, ProviderError, StaticProvider};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn standup() -> Event {
        let start = now() + Duration::seconds(60);
        Event::new("standup", start, start + Duration::minutes(15))
            .with_title("Standup")
            .with_notes("https://meet.google.com/abc-defg-hij")
    }

    fn context(
        provider: Arc<dyn CalendarProvider>,
        recorder: &Arc<Recorder>,
    ) -> (AppContext, Arc<MemorySettingsStore>) {
        let settings = Arc::new(MemorySettingsStore::new());
        let outputs = Outputs {
            status: recorder.clone(),
            presenter: recorder.clone(),
            opener: recorder.clone(),
            notices: recorder.clone(),
        };
        let ctx = AppContext::new(
            provider,
            settings.clone(),
            outputs,
            Arc::new(ManualClock::new(now())),
        );
        (ctx, settings)
    }

    mod tick {
        use super::*;

        #[tokio::test]
        async fn alerts_then_updates_status() {
            let recorder = Recorder::new();
            let (mut ctx, _) = context(Arc::new(StaticProvider::new(vec![standup()])), &recorder);

            ctx.tick().await;

            assert_eq!(recorder.presented(), ["standup"]);
            assert_eq!(
                recorder.last_status(),
                Some(("Standup in 1m".to_string(), StatusIcon::None))
            );
            assert_eq!(ctx.alerts().visible(), 1);
        }

        #[tokio::test]
        async fn repeated_tick_in_same_slot_alerts_again() {
            let recorder = Recorder::new();
            let (mut ctx, _) = context(Arc::new(StaticProvider::new(vec![standup()])), &recorder);

            ctx.tick().await;
            ctx.tick().await;

            assert_eq!(recorder.presented(), ["standup", "standup"]);
        }

        #[tokio::test]
        async fn provider_failure_leaves_idle_status() {
            let recorder = Recorder::new();
            let provider = ErrorProvider::new("broken", ProviderError::network("down"));
            let (mut ctx, _) = context(Arc::new(provider), &recorder);

            ctx.tick().await;

            assert!(recorder.presented().is_empty());
            assert_eq!(
                recorder.last_status(),
                Some((String::new(), StatusIcon::Calendar))
            );
        }

        #[tokio::test]
        async fn untitled_placeholder_is_configurable() {
            let recorder = Recorder::new();
            let start = now() + Duration::minutes(5);
            let event = Event::new("x", start, start + Duration::minutes(5));
            let (ctx, _) = context(Arc::new(StaticProvider::new(vec![event])), &recorder);
            let mut ctx = ctx.with_no_title("Busy");

            ctx.tick().await;

            assert_eq!(recorder.last_status().unwrap().0, "Busy in 5m");
        }
    }

    mod access {
        use super::*;

        #[tokio::test]
        async fn denied_shows_notice_and_fails() {
            let recorder = Recorder::new();
            let provider = ErrorProvider::new(
                "unconfigured",
                ProviderError::access_denied("no calendar source configured"),
            );
            let (ctx, _) = context(Arc::new(provider), &recorder);

            let err = ctx.request_access().await.unwrap_err();
            assert!(matches!(err, DaemonError::AccessDenied { .. }));
            let notice = recorder.calls().into_iter().find_map(|c| match c {
                Call::Notice(title, body) => Some((title, body)),
                _ => None,
            });
            let (title, body) = notice.unwrap();
            assert_eq!(title, ACCESS_REQUIRED_TITLE);
            assert!(body.ends_with("no calendar source configured"));
        }

        #[tokio::test]
        async fn run_stops_on_denied_access() {
            let recorder = Recorder::new();
            let provider = ErrorProvider::new("x", ProviderError::access_denied("nope"));
            let (ctx, _) = context(Arc::new(provider), &recorder);
            let (_tx, rx) = mpsc::channel(4);

            let result = ctx.run(rx, Shutdown::new()).await;
            assert!(matches!(result, Err(DaemonError::AccessDenied { .. })));
            assert!(recorder.presented().is_empty());
        }
    }

    mod queries {
        use super::*;

        #[tokio::test]
        async fn agenda_respects_past_events_toggle() {
            let recorder = Recorder::new();
            let finished = Event::new(
                "finished",
                now() - Duration::minutes(30),
                now() - Duration::minutes(10),
            );
            let provider = Arc::new(StaticProvider::new(vec![finished, standup()]));
            let (ctx, settings) = context(provider, &recorder);

            let ids = |agenda: EventsByDay| -> Vec<String> {
                agenda.events().map(|e| e.id.clone()).collect()
            };
            assert_eq!(ids(ctx.fetch_agenda(now()).await.unwrap()), ["standup"]);

            settings
                .set_bool(SettingKey::ShowPastEventsForToday, true)
                .unwrap();
            let with_past = ids(ctx.fetch_agenda(now()).await.unwrap());
            assert!(with_past.contains(&"finished".to_string()));
            assert!(with_past.contains(&"standup".to_string()));
        }

        #[tokio::test]
        async fn find_event_by_id() {
            let recorder = Recorder::new();
            let (ctx, _) = context(Arc::new(StaticProvider::new(vec![standup()])), &recorder);
            assert!(ctx.find_event(now(), "standup").await.unwrap().is_some());
            assert!(ctx.find_event(now(), "missing").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn next_event_state() {
            let recorder = Recorder::new();
            let (ctx, _) = context(Arc::new(StaticProvider::new(vec![standup()])), &recorder);
            let state = ctx.next_event_state(now()).await.unwrap();
            assert_eq!(state.label(), "Standup in 1m");
        }
    }

    mod run_loop {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn first_tick_alerts_and_input_joins() {
            let recorder = Recorder::new();
            let (ctx, _) = context(Arc::new(StaticProvider::new(vec![standup()])), &recorder);
            let (tx, rx) = mpsc::channel(4);
            let shutdown = Shutdown::new();

            let driver = {
                let shutdown = shutdown.clone();
                async move {
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    tx.send(AlertInput::Join).await.unwrap();
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    shutdown.trigger();
                }
            };

            let (result, ()) = tokio::join!(ctx.run(rx, shutdown), driver);
            result.unwrap();

            assert_eq!(recorder.presented(), ["standup"]);
            assert!(recorder
                .calls()
                .contains(&Call::Open("https://meet.google.com/abc-defg-hij".into())));
            assert!(recorder.calls().contains(&Call::Dismiss("standup".into())));
        }

        #[tokio::test]
        async fn run_alert_returns_on_dismissal() {
            let recorder = Recorder::new();
            let (mut ctx, _) = context(Arc::new(StaticProvider::new(vec![])), &recorder);
            let (tx, mut rx) = mpsc::channel(4);
            tx.send(AlertInput::Skip).await.unwrap();

            let dismissal = ctx.run_alert(standup(), &mut rx).await;
            assert_eq!(dismissal, Some(Dismissal::Closed(AlertInput::Skip)));
            assert_eq!(ctx.alerts().visible(), 0);
        }
    }
}
