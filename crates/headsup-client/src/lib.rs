//! The `headsup` command-line interface.
//!
//! Wires the daemon to a terminal, `config.toml` and `settings.toml`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod settings;
pub mod terminal;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
