//! Daemon error types.

use std::io;
use thiserror::Error;

use headsup_providers::ProviderError;

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Errors that stop the daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The calendar refused access. Terminal: the daemon exits.
    #[error("Calendar access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DaemonError {
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
