//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use headsup_core::LogFormat;

/// headsup - a one-minute warning before every meeting
#[derive(Debug, Parser)]
#[command(name = "headsup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "HEADSUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The configuration file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::ClientConfig::default_path)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch the calendar and alert one minute before each meeting (default)
    Run {
        /// Log line layout: pretty, compact or json
        #[arg(long, default_value = "compact", value_parser = parse_log_format)]
        log_format: LogFormat,
    },

    /// Print the next meeting summary once
    Next {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List upcoming events grouped by day
    Agenda {
        /// Show event ids, for `headsup alert` and `headsup link`
        #[arg(long)]
        ids: bool,
    },

    /// Show the alert for an event now
    Alert {
        /// Event id, as listed by `headsup agenda --ids`
        event_id: String,
    },

    /// Print the join link of an event
    Link {
        /// Event id, as listed by `headsup agenda --ids`
        event_id: String,

        /// Open the link in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Display toggles
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Run {
            log_format: LogFormat::Compact,
        }
    }
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    s.parse().map_err(|e: headsup_core::TracingError| e.to_string())
}

/// Settings actions. Keys: `AlwaysShowNextEvent`, `ShowPastEventsForToday`.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show every toggle and its value
    List,

    /// Print one toggle
    Get { key: String },

    /// Set a toggle (true/false, on/off, yes/no, 1/0)
    Set { key: String, value: String },

    /// Flip a toggle
    Toggle { key: String },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["headsup"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Command::Run {
                log_format: LogFormat::Compact
            }
        ));
    }

    #[test]
    fn run_with_json_logs() {
        let cli = Cli::try_parse_from(["headsup", "run", "--log-format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Run {
                log_format: LogFormat::Json
            })
        ));
    }

    #[test]
    fn bad_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["headsup", "run", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["headsup", "next", "--json", "--config", "/tmp/h.toml", "-v"])
                .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/h.toml"));
        assert!(matches!(cli.command, Some(Command::Next { json: true })));
    }

    #[test]
    fn settings_set() {
        let cli =
            Cli::try_parse_from(["headsup", "settings", "set", "AlwaysShowNextEvent", "on"])
                .unwrap();
        match cli.command {
            Some(Command::Settings {
                action: SettingsAction::Set { key, value },
            }) => {
                assert_eq!(key, "AlwaysShowNextEvent");
                assert_eq!(value, "on");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
