//! iCalendar provider.
//!
//! Reads a `.ics` file or feed on every query. No caching: the daemon queries
//! a one-second window each minute and a seven-day window for the summary.

mod parse;
mod provider;
mod recur;
mod source;

pub use parse::parse_ics;
pub use provider::IcsProvider;
pub use source::{DEFAULT_TIMEOUT, IcsFetcher, IcsSource};
