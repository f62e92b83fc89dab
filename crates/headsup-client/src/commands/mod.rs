//! Command implementations.

pub mod config;
pub mod query;
pub mod run;
pub mod settings;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use headsup_daemon::{
    AppContext, DesktopNotifier, NoticeSink, Outputs, PresenterSet, SystemClock,
};
use headsup_providers::{CalendarProvider, ErrorProvider, IcsProvider, ProviderError};

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::settings::TomlSettingsStore;
use crate::terminal::{BrowserOpener, Terminal};

/// Builds the calendar provider described by `[calendar]`.
///
/// Without a source, every access request is denied.
pub fn provider(config: &ClientConfig) -> ClientResult<Arc<dyn CalendarProvider>> {
    let Some(source) = config.calendar_source()? else {
        return Ok(Arc::new(ErrorProvider::new(
            "unconfigured",
            ProviderError::access_denied("no calendar source configured"),
        )));
    };

    let mut provider =
        IcsProvider::with_timeout(source, Duration::from_secs(config.calendar.timeout))?;
    if let Some(ref name) = config.calendar.name {
        provider = provider.with_name(name);
    }
    if let Some(tz) = config.calendar_timezone()? {
        provider = provider.with_timezone(tz);
    }
    debug!(source = %provider.source(), "Calendar provider ready");
    Ok(Arc::new(provider))
}

/// Terminal output, plus desktop notifications when enabled.
pub fn outputs(config: &ClientConfig) -> Outputs {
    let terminal = Arc::new(Terminal::stdout());
    let mut presenters = PresenterSet::new().with(terminal.clone());
    if config.alerts.desktop_notifications {
        presenters = presenters.with(Arc::new(DesktopNotifier::default()));
    }
    let notices: Arc<dyn NoticeSink> = terminal.clone();
    Outputs {
        status: terminal,
        presenter: Arc::new(presenters),
        opener: Arc::new(BrowserOpener),
        notices,
    }
}

/// Wires the application from the config file at `config_path`.
pub fn context(config: &ClientConfig, config_path: &Path) -> ClientResult<AppContext> {
    let settings = TomlSettingsStore::new(ClientConfig::settings_path_for(config_path));
    Ok(AppContext::new(
        provider(config)?,
        Arc::new(settings),
        outputs(config),
        Arc::new(SystemClock),
    )
    .with_no_title(config.display.no_title_text.clone()))
}
