//! Output seams driven by the daemon.
//!
//! The daemon decides *what* to show and *when*; these traits decide how. The
//! `headsup` binary wires terminal and desktop implementations, tests wire
//! recorders.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use url::Url;

use headsup_core::{AlertContent, StatusIcon};

/// The persistent status line (menu bar title in a GUI).
pub trait StatusDisplay: Send + Sync {
    /// Replaces the label and icon. Called once per minute tick.
    fn update(&self, label: &str, icon: StatusIcon);
}

/// Renders alerts.
pub trait AlertPresenter: Send + Sync {
    /// Shows a new alert.
    fn present(&self, content: &AlertContent, now: DateTime<Utc>);

    /// Refreshes the countdown line of a visible alert. Called every second.
    fn countdown(&self, _event_id: &str, _line: &str) {}

    /// Removes a dismissed alert.
    fn dismiss(&self, _event_id: &str) {}
}

/// Opens a join link.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &Url) -> Result<(), String>;
}

/// Shows a blocking informational notice.
pub trait NoticeSink: Send + Sync {
    fn notice(&self, title: &str, body: &str);
}

/// Forwards alerts to several presenters, e.g. the terminal and the desktop.
#[derive(Default, Clone)]
pub struct PresenterSet {
    presenters: Vec<Arc<dyn AlertPresenter>>,
}

impl PresenterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, presenter: Arc<dyn AlertPresenter>) -> Self {
        self.presenters.push(presenter);
        self
    }

    pub fn len(&self) -> usize {
        self.presenters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presenters.is_empty()
    }
}

impl AlertPresenter for PresenterSet {
    fn present(&self, content: &AlertContent, now: DateTime<Utc>) {
        for p in &self.presenters {
            p.present(content, now);
        }
    }

    fn countdown(&self, event_id: &str, line: &str) {
        for p in &self.presenters {
            p.countdown(event_id, line);
        }
    }

    fn dismiss(&self, event_id: &str) {
        for p in &self.presenters {
            p.dismiss(event_id);
        }
    }
}
