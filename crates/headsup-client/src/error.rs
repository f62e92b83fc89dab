//! Client error types.

use thiserror::Error;

use headsup_core::{SettingsError, TracingError};
use headsup_daemon::DaemonError;
use headsup_providers::ProviderError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Daemon(#[from] DaemonError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Action failed (open, lookup, ...).
    #[error("action failed: {0}")]
    Action(String),
}
