//! User preferences.
//!
//! Two boolean toggles, persisted by a [`SettingsStore`] under their exact key
//! names. Values are read from the store at each decision point; nothing caches
//! them between ticks.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The key is not one of the known toggles.
    #[error("unknown setting: {0} (expected AlwaysShowNextEvent or ShowPastEventsForToday)")]
    UnknownKey(String),

    /// The value is not a boolean.
    #[error("invalid value for {key}: {value} (expected true or false)")]
    InvalidValue { key: SettingKey, value: String },

    /// The backing store failed.
    #[error("settings store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SettingsError {
    /// Creates a store error with an underlying cause.
    pub fn store(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// A persisted toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SettingKey {
    /// Show the next event in the status display even when it is not today.
    AlwaysShowNextEvent,
    /// List today's finished events in the agenda.
    ShowPastEventsForToday,
}

impl SettingKey {
    /// Every key, in display order.
    pub const ALL: [SettingKey; 2] = [Self::AlwaysShowNextEvent, Self::ShowPastEventsForToday];

    /// The persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlwaysShowNextEvent => "AlwaysShowNextEvent",
            Self::ShowPastEventsForToday => "ShowPastEventsForToday",
        }
    }

    /// Menu text for the toggle.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AlwaysShowNextEvent => "Always show next event",
            Self::ShowPastEventsForToday => "Show past events for today",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Parses a user-supplied boolean.
pub fn parse_bool(key: SettingKey, value: &str) -> SettingsResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Boolean key/value persistence.
///
/// Missing keys read as `false`.
pub trait SettingsStore: Send + Sync {
    /// Reads a toggle.
    fn get_bool(&self, key: SettingKey) -> bool;

    /// Writes a toggle.
    fn set_bool(&self, key: SettingKey, value: bool) -> SettingsResult<()>;

    /// Flips a toggle and returns the new value.
    fn toggle(&self, key: SettingKey) -> SettingsResult<bool> {
        let value = !self.get_bool(key);
        self.set_bool(key, value)?;
        tracing::info!(%key, value, "Setting toggled");
        Ok(value)
    }
}

/// A snapshot of both toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub always_show_next_event: bool,
    pub show_past_events_for_today: bool,
}

impl Settings {
    /// Reads both toggles from `store`.
    pub fn load(store: &dyn SettingsStore) -> Self {
        Self {
            always_show_next_event: store.get_bool(SettingKey::AlwaysShowNextEvent),
            show_past_events_for_today: store.get_bool(SettingKey::ShowPastEventsForToday),
        }
    }

    /// Returns the value of `key`.
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::AlwaysShowNextEvent => self.always_show_next_event,
            SettingKey::ShowPastEventsForToday => self.show_past_events_for_today,
        }
    }

    /// Builder method to set `always_show_next_event`.
    pub fn with_always_show_next_event(mut self, value: bool) -> Self {
        self.always_show_next_event = value;
        self
    }

    /// Builder method to set `show_past_events_for_today`.
    pub fn with_show_past_events_for_today(mut self, value: bool) -> Self {
        self.show_past_events_for_today = value;
        self
    }
}

/// In-memory store, used by tests and one-shot commands.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<SettingKey, bool>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from a snapshot.
    pub fn from_settings(settings: Settings) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.write() {
            for key in SettingKey::ALL {
                values.insert(key, settings.get(key));
            }
        }
        store
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_bool(&self, key: SettingKey) -> bool {
        self.values
            .read()
            .map(|v| v.get(&key).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    fn set_bool(&self, key: SettingKey, value: bool) -> SettingsResult<()> {
        let mut values = self.values.write().map_err(|_| SettingsError::Store {
            message: "settings lock poisoned".into(),
            source: None,
        })?;
        values.insert(key, value);
        Ok(())
    }
}
