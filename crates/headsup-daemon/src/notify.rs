//! Desktop notifications through the platform notification service.
//!
//! On freedesktop platforms the handle of each alert is kept so that
//! dismissing the alert also closes its notification. Elsewhere the
//! notification stays until it times out.

#[cfg(all(unix, not(target_os = "macos")))]
use std::collections::HashMap;
#[cfg(all(unix, not(target_os = "macos")))]
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use notify_rust::Notification;
#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::NotificationHandle;
#[cfg(target_os = "linux")]
use notify_rust::Urgency;
use tracing::{debug, error, info};

use headsup_core::AlertContent;

use crate::seams::{AlertPresenter, NoticeSink};

/// Notification settings.
#[derive(Debug, Clone)]
pub struct DesktopConfig {
    pub app_name: String,
    /// How long alert notifications stay up.
    pub timeout: Duration,
    pub icon: Option<String>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            app_name: "headsup".to_string(),
            timeout: Duration::from_secs(60),
            icon: Some("x-office-calendar".to_string()),
        }
    }
}

/// Shows alerts and notices as desktop notifications.
#[derive(Debug, Default)]
pub struct DesktopNotifier {
    config: DesktopConfig,
    /// Alerts on screen, by event id.
    #[cfg(all(unix, not(target_os = "macos")))]
    shown: Mutex<HashMap<String, NotificationHandle>>,
}

impl DesktopNotifier {
    pub fn new(config: DesktopConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn track(&self, event_id: &str, handle: NotificationHandle) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.insert(event_id.to_string(), handle);
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn track<H>(&self, _event_id: &str, _handle: H) {}

    /// Stops tracking the alert of `event_id`, returning its handle.
    #[cfg(all(unix, not(target_os = "macos")))]
    fn untrack(&self, event_id: &str) -> Option<NotificationHandle> {
        self.shown.lock().ok()?.remove(event_id)
    }

    /// Number of alerts whose notification can still be closed.
    #[cfg(all(test, unix, not(target_os = "macos")))]
    fn tracked(&self) -> usize {
        self.shown.lock().map_or(0, |shown| shown.len())
    }

    fn build(&self, summary: &str, body: &str, critical: bool) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(&self.config.app_name)
            .summary(summary)
            .body(body)
            .timeout(self.config.timeout);

        if let Some(ref icon) = self.config.icon {
            notification.icon(icon);
        }

        #[cfg(target_os = "linux")]
        notification.urgency(if critical {
            Urgency::Critical
        } else {
            Urgency::Normal
        });
        #[cfg(not(target_os = "linux"))]
        let _ = critical;

        notification
    }
}

impl AlertPresenter for DesktopNotifier {
    fn present(&self, content: &AlertContent, now: DateTime<Utc>) {
        match self.build(&content.title, &content.body(now), true).show() {
            Ok(handle) => {
                info!(event_id = %content.event_id, "Desktop notification sent");
                self.track(&content.event_id, handle);
            }
            Err(e) => error!(error = %e, event_id = %content.event_id, "Failed to send notification"),
        }
    }

    fn dismiss(&self, event_id: &str) {
        #[cfg(all(unix, not(target_os = "macos")))]
        if let Some(handle) = self.untrack(event_id) {
            handle.close();
            debug!(event_id, "Desktop notification closed");
            return;
        }
        debug!(event_id, "No desktop notification to close");
    }
}

impl NoticeSink for DesktopNotifier {
    fn notice(&self, title: &str, body: &str) {
        if let Err(e) = self.build(title, body, false).show() {
            error!(error = %e, title, "Failed to send notice");
        }
    }
}
