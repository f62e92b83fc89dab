//! Terminal implementations of the daemon's output seams.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use url::Url;

use headsup_core::{AlertContent, StatusIcon};
use headsup_daemon::{AlertPresenter, LinkOpener, NoticeSink, StatusDisplay};

/// Writes status, alerts and notices to a shared writer, stdout by default.
pub struct Terminal<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl Terminal {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // A closed stdout is not worth failing the loop over.
        let _ = out.write_all(text.as_bytes()).and_then(|()| out.flush());
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Formats the status line: glyph when idle, label otherwise.
pub fn status_line(label: &str, icon: StatusIcon) -> String {
    match icon {
        StatusIcon::Calendar if label.is_empty() => icon.glyph().to_string(),
        StatusIcon::Calendar => format!("{} {label}", icon.glyph()),
        StatusIcon::None => label.to_string(),
    }
}

impl<W: Write + Send> StatusDisplay for Terminal<W> {
    fn update(&self, label: &str, icon: StatusIcon) {
        self.write(&format!("[headsup] {}\n", status_line(label, icon)));
    }
}

impl<W: Write + Send> AlertPresenter for Terminal<W> {
    fn present(&self, content: &AlertContent, now: DateTime<Utc>) {
        let rule = "=".repeat(48);
        self.write(&format!("\n{rule}\n{}\n{rule}\n", content.render(now)));
    }

    fn countdown(&self, _event_id: &str, line: &str) {
        self.write(&format!("\r{line}   "));
    }

    fn dismiss(&self, event_id: &str) {
        debug!(event_id, "Alert closed");
        self.write("\n");
    }
}

impl<W: Write + Send> NoticeSink for Terminal<W> {
    fn notice(&self, title: &str, body: &str) {
        self.write(&format!("\n{title}\n{body}\n"));
    }
}

/// Opens links in the default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, url: &Url) -> Result<(), String> {
        info!(%url, "Opening in browser");
        open::that(url.as_str()).map_err(|e| e.to_string())
    }
}
