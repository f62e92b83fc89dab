//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/headsup/config.toml` by default. The toggles changed from the
//! command line live next to it in `settings.toml`.
//!
//! ```toml
//! [calendar]
//! source = "https://example.com/team.ics"
//! name = "team"
//! timezone = "Europe/Paris"
//!
//! [alerts]
//! desktop_notifications = true
//!
//! [display]
//! no_title_text = "No Title"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use headsup_core::NO_TITLE;
use headsup_providers::IcsSource;

use crate::error::{ClientError, ClientResult};

/// Configuration for the headsup client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Calendar source.
    pub calendar: CalendarSettings,

    /// Alert presentation.
    pub alerts: AlertSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Where events come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Path to an `.ics` file or an `http(s)`/`webcal` feed URL.
    ///
    /// Without a source, calendar access is denied.
    pub source: Option<String>,

    /// Provider name shown in logs.
    pub name: Option<String>,

    /// IANA zone for floating times and all-day events. Defaults to the
    /// system zone.
    pub timezone: Option<String>,

    /// Feed request timeout in seconds.
    pub timeout: u64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            source: None,
            name: None,
            timezone: None,
            timeout: 30,
        }
    }
}

/// Alert settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Also show alerts as desktop notifications.
    pub desktop_notifications: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            desktop_notifications: true,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Placeholder for events without a title.
    pub no_title_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            no_title_text: NO_TITLE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults when absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("headsup")
    }

    /// `settings.toml` next to the given config file.
    pub fn settings_path_for(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .map(|dir| dir.join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Parses the calendar source, if one is configured.
    pub fn calendar_source(&self) -> ClientResult<Option<IcsSource>> {
        self.calendar
            .source
            .as_deref()
            .map(IcsSource::parse)
            .transpose()
            .map_err(ClientError::from)
    }

    /// Parses the configured calendar zone.
    pub fn calendar_timezone(&self) -> ClientResult<Option<chrono_tz::Tz>> {
        self.calendar
            .timezone
            .as_deref()
            .map(|name| {
                name.parse::<chrono_tz::Tz>()
                    .map_err(|_| ClientError::Config(format!("unknown timezone: {name}")))
            })
            .transpose()
    }

    /// Checks every field that can be checked without network access.
    pub fn validate(&self) -> ClientResult<()> {
        self.calendar_source()?;
        self.calendar_timezone()?;
        if self.calendar.timeout == 0 {
            return Err(ClientError::Config(
                "calendar timeout must be at least one second".into(),
            ));
        }
        if self.display.no_title_text.trim().is_empty() {
            return Err(ClientError::Config("no_title_text must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert!(config.calendar.source.is_none());
        assert_eq!(config.calendar.timeout, 30);
        assert!(config.alerts.desktop_notifications);
        assert_eq!(config.display.no_title_text, "No Title");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_file() {
        let toml_content = r#"
[calendar]
source = "https://example.com/team.ics"
name = "team"
timezone = "Europe/Paris"

[alerts]
desktop_notifications = false

[display]
no_title_text = "Busy"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert!(!config.alerts.desktop_notifications);
        assert_eq!(config.display.no_title_text, "Busy");
        assert_eq!(config.calendar.name.as_deref(), Some("team"));
        assert_eq!(
            config.calendar_timezone().unwrap(),
            Some(chrono_tz::Europe::Paris)
        );
        assert!(matches!(
            config.calendar_source().unwrap(),
            Some(IcsSource::Http(_))
        ));
    }

    #[test]
    fn unknown_timezone_fails_validation() {
        let config: ClientConfig = toml::from_str("[calendar]\ntimezone = \"Mars/Olympus\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn empty_source_fails_validation() {
        let config: ClientConfig = toml::from_str("[calendar]\nsource = \"  \"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nno_title_text = \"Private\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.display.no_title_text, "Private");
        assert_eq!(
            ClientConfig::settings_path_for(&path),
            dir.path().join("settings.toml")
        );
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[alerts]\ndesktop_notifications = \"maybe\"\n").unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
