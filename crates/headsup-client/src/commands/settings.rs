//! Settings commands.

use headsup_core::{SettingKey, Settings, SettingsStore, parse_bool};

use crate::error::ClientResult;

/// One line per toggle: `Key = value  # description`.
pub fn list(store: &dyn SettingsStore) -> String {
    let settings = Settings::load(store);
    SettingKey::ALL
        .iter()
        .map(|key| {
            format!(
                "{} = {}  # {}\n",
                key.as_str(),
                settings.get(*key),
                key.description()
            )
        })
        .collect()
}

pub fn get(store: &dyn SettingsStore, key: &str) -> ClientResult<bool> {
    let key: SettingKey = key.parse()?;
    Ok(store.get_bool(key))
}

/// Stores `value` for `key` and returns it.
pub fn set(store: &dyn SettingsStore, key: &str, value: &str) -> ClientResult<bool> {
    let key: SettingKey = key.parse()?;
    let value = parse_bool(key, value)?;
    store.set_bool(key, value)?;
    Ok(value)
}

/// Flips `key` and returns the new value.
pub fn toggle(store: &dyn SettingsStore, key: &str) -> ClientResult<bool> {
    let key: SettingKey = key.parse()?;
    Ok(store.toggle(key)?)
}
