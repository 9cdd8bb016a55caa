use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::workout::config::DEFAULT_REST_SECONDS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySettings {
    /// Start the rest countdown automatically after a recorded set.
    pub auto_start: bool,
    /// Rest recorded on a set when the caller does not provide one.
    pub default_rest_seconds: u32,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            auto_start: true,
            default_rest_seconds: DEFAULT_REST_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    recovery: RecoverySettings,
}

/// User preferences persisted as pretty JSON next to the app data.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Defaults only, nothing written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(UserSettings::default()),
        }
    }

    pub fn recovery(&self) -> RecoverySettings {
        match self.data.read() {
            Ok(guard) => guard.recovery.clone(),
            Err(poisoned) => poisoned.into_inner().recovery.clone(),
        }
    }

    pub fn update_recovery(&self, settings: RecoverySettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.recovery = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = fs::read_to_string(path)?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.recovery(), RecoverySettings::default());
    }

    #[test]
    fn updates_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let updated = RecoverySettings {
            auto_start: false,
            default_rest_seconds: 75,
        };
        store.update_recovery(updated.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.recovery(), updated);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.recovery(), RecoverySettings::default());
        assert!(store.reload().is_err());
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let store = SettingsStore::in_memory();
        store
            .update_recovery(RecoverySettings {
                auto_start: false,
                default_rest_seconds: 30,
            })
            .unwrap();
        assert!(!store.recovery().auto_start);
        store.reload().unwrap();
        assert!(!store.recovery().auto_start);
    }
}
