//! `settings.toml`: the persisted display toggles.
//!
//! Keys are stored under their exact names, e.g.
//!
//! ```toml
//! AlwaysShowNextEvent = true
//! ShowPastEventsForToday = false
//! ```
//!
//! The file is read on every lookup so that `headsup settings toggle` takes
//! effect on the next tick of a running `headsup run`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use headsup_core::{SettingKey, SettingsError, SettingsResult, SettingsStore};

/// [`SettingsStore`] backed by a TOML file.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> SettingsResult<toml::Table> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(toml::Table::new()),
            Err(e) => {
                return Err(SettingsError::store(
                    format!("failed to read {}", self.path.display()),
                    e,
                ));
            }
        };
        content.parse::<toml::Table>().map_err(|e| {
            SettingsError::store(format!("failed to parse {}", self.path.display()), e)
        })
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get_bool(&self, key: SettingKey) -> bool {
        match self.read_table() {
            Ok(table) => table
                .get(key.as_str())
                .and_then(toml::Value::as_bool)
                .unwrap_or(false),
            Err(e) => {
                warn!(error = %e, %key, "Settings unreadable, using false");
                false
            }
        }
    }

    fn set_bool(&self, key: SettingKey, value: bool) -> SettingsResult<()> {
        let mut table = self.read_table()?;
        table.insert(key.as_str().to_string(), toml::Value::Boolean(value));

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                SettingsError::store(format!("failed to create {}", dir.display()), e)
            })?;
        }
        let content = toml::to_string(&table)
            .map_err(|e| SettingsError::store("failed to serialize settings", e))?;
        std::fs::write(&self.path, content).map_err(|e| {
            SettingsError::store(format!("failed to write {}", self.path.display()), e)
        })?;
        debug!(%key, value, path = %self.path.display(), "Setting saved");
        Ok(())
    }
}
