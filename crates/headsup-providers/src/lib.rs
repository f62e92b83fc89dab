//! Calendar providers for headsup.
//!
//! - [`CalendarProvider`]: the seam the daemon talks to
//! - [`IcsProvider`]: events from an iCalendar file or HTTP feed
//! - [`StaticProvider`]: a fixed in-memory list
//! - [`ErrorProvider`]: refuses access, used when nothing is configured
//!
//! # Example
//!
//! ```ignore
//! use headsup_providers::{CalendarProvider, IcsProvider, IcsSource};
//!
//! let provider = IcsProvider::new(IcsSource::parse("~/calendar.ics")?)?;
//! if provider.request_access().await.is_granted() {
//!     let events = provider.query_events(TimeWindow::lookahead(Utc::now())).await?;
//! }
//! ```

pub mod error;
#[cfg(feature = "ics")]
pub mod ics;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
#[cfg(feature = "ics")]
pub use ics::{IcsProvider, IcsSource};
pub use provider::{
    AccessStatus, BoxFuture, CalendarProvider, ErrorProvider, StaticProvider, select_window,
};
