//! Visible alerts and their countdowns.
//!
//! Each presented event gets an [`AlertSession`] and a one-second countdown
//! task. Inputs go to the most recently presented alert, the one on top. The
//! first dismissal pops the alert and aborts its countdown; dropping the
//! controller aborts every countdown still running.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use headsup_core::{
    AlertContent, AlertInput, AlertSession, Dismissal, Event, NO_LINK_BODY, NO_LINK_TITLE,
};

use crate::seams::{AlertPresenter, LinkOpener, NoticeSink};
use crate::ticker::Clock;

/// Countdown refresh period.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

struct ActiveAlert {
    session: AlertSession,
    countdown: JoinHandle<()>,
}

impl Drop for ActiveAlert {
    fn drop(&mut self) {
        self.countdown.abort();
    }
}

/// Owns the visible alerts.
pub struct AlertController {
    presenter: Arc<dyn AlertPresenter>,
    opener: Arc<dyn LinkOpener>,
    notices: Arc<dyn NoticeSink>,
    clock: Arc<dyn Clock>,
    no_title: String,
    active: Vec<ActiveAlert>,
}

impl AlertController {
    pub fn new(
        presenter: Arc<dyn AlertPresenter>,
        opener: Arc<dyn LinkOpener>,
        notices: Arc<dyn NoticeSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presenter,
            opener,
            notices,
            clock,
            no_title: headsup_core::NO_TITLE.to_string(),
            active: Vec::new(),
        }
    }

    /// Builder method to set the placeholder for untitled events.
    pub fn with_no_title(mut self, no_title: impl Into<String>) -> Self {
        self.no_title = no_title.into();
        self
    }

    /// Number of visible alerts.
    pub fn visible(&self) -> usize {
        self.active.len()
    }

    /// The alert inputs currently apply to.
    pub fn current(&self) -> Option<&Event> {
        self.active.last().map(|a| a.session.event())
    }

    /// Shows an alert for `event` and starts its countdown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn present(&mut self, event: Event) {
        let content = AlertContent::new_in(&event, &Local, &self.no_title);
        info!(event_id = %event.id, title = %content.title, "Presenting alert");
        self.presenter.present(&content, self.clock.now());

        let countdown = spawn_countdown(content, self.presenter.clone(), self.clock.clone());
        self.active.push(ActiveAlert {
            session: AlertSession::new(event),
            countdown,
        });
    }

    /// Applies an input to the top alert.
    ///
    /// Returns `None` when no alert is visible.
    pub fn handle(&mut self, input: AlertInput) -> Option<Dismissal> {
        let dismissal = self.active.last_mut()?.session.handle(input)?;
        if let Some(alert) = self.active.pop() {
            alert.countdown.abort();
            self.presenter.dismiss(&alert.session.event().id);
        }

        match &dismissal {
            Dismissal::Join(link) => {
                info!(url = %link.url, service = %link.service, "Joining meeting");
                if let Err(e) = self.opener.open(&link.url) {
                    warn!(url = %link.url, error = %e, "Failed to open meeting link");
                }
            }
            Dismissal::NoLink => {
                debug!("No meeting link to join");
                self.notices.notice(NO_LINK_TITLE, NO_LINK_BODY);
            }
            Dismissal::Closed(_) => {}
        }
        Some(dismissal)
    }

    /// Closes every visible alert.
    pub fn dismiss_all(&mut self) {
        while self.handle(AlertInput::Close).is_some() {}
    }
}

fn spawn_countdown(
    content: AlertContent,
    presenter: Arc<dyn AlertPresenter>,
    clock: Arc<dyn Clock>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(COUNTDOWN_PERIOD);
        loop {
            interval.tick().await;
            presenter.countdown(&content.event_id, &content.countdown(clock.now()));
        }
    })
}
