//! Alert daemon: minute ticks, meeting alerts, status updates.
//!
//! The daemon never draws anything itself. It drives the seams in [`seams`]
//! (status line, alert presenter, link opener, notices) from a single task:
//!
//! - every minute, aligned to the wall clock, it asks the calendar for meetings
//!   starting in one minute and presents an alert for each;
//! - after that it refreshes the status line with the next meeting;
//! - alert inputs (join, skip, close) arrive on a channel and act on the top
//!   alert.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use headsup_core::MemorySettingsStore;
//! use headsup_daemon::{AppContext, DesktopNotifier, Outputs, Shutdown, SystemClock};
//! use headsup_providers::{IcsProvider, IcsSource};
//! # use headsup_daemon::{LinkOpener, StatusDisplay};
//! # struct Noop;
//! # impl StatusDisplay for Noop { fn update(&self, _: &str, _: headsup_core::StatusIcon) {} }
//! # impl LinkOpener for Noop { fn open(&self, _: &url::Url) -> Result<(), String> { Ok(()) } }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = IcsProvider::new(IcsSource::parse("~/calendar.ics")?)?;
//!     let desktop = Arc::new(DesktopNotifier::default());
//!     let outputs = Outputs {
//!         status: Arc::new(Noop),
//!         presenter: desktop.clone(),
//!         opener: Arc::new(Noop),
//!         notices: desktop,
//!     };
//!     let app = AppContext::new(
//!         Arc::new(provider),
//!         Arc::new(MemorySettingsStore::new()),
//!         outputs,
//!         Arc::new(SystemClock),
//!     );
//!
//!     let shutdown = Shutdown::new();
//!     shutdown.listen_for_signals()?;
//!     let (_inputs, rx) = tokio::sync::mpsc::channel(8);
//!     app.run(rx, shutdown).await?;
//!     Ok(())
//! }
//! ```

mod app;
mod controller;
mod detector;
mod error;
mod notify;
pub mod seams;
mod signals;
mod ticker;

pub use app::{ACCESS_REQUIRED_BODY, ACCESS_REQUIRED_TITLE, AppContext, Outputs};
pub use controller::{AlertController, COUNTDOWN_PERIOD};
pub use detector::UpcomingDetector;
pub use error::{DaemonError, DaemonResult};
pub use notify::{DesktopConfig, DesktopNotifier};
pub use seams::{AlertPresenter, LinkOpener, NoticeSink, PresenterSet, StatusDisplay};
pub use signals::Shutdown;
pub use ticker::{Clock, MinuteTicker, SystemClock, TICK_PERIOD, until_next_minute};
