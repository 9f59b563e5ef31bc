//! Settings persistence

mod schema;

pub use schema::{Settings, parse_interval};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where settings are loaded from and saved to
pub trait SettingsStore: Send + Sync {
    /// Load persisted settings, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Settings>>;

    /// Persist settings
    fn save(&self, settings: &Settings) -> Result<()>;
}

impl Settings {
    /// Load settings from a store, falling back to the defaults
    pub fn load_from(store: &dyn SettingsStore) -> Result<Self> {
        Ok(store.load()?.unwrap_or_default())
    }

    /// Apply a change and persist it before anything else can mutate the settings
    pub fn edit<R>(
        &mut self,
        store: &dyn SettingsStore,
        change: impl FnOnce(&mut Settings) -> R,
    ) -> Result<R> {
        let result = change(self);
        store.save(self)?;
        Ok(result)
    }
}

/// Settings kept as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings file inside a vault, next to the host application's plugin data
    pub fn for_vault(vault: &Path) -> Self {
        Self::new(Self::default_path(vault))
    }

    pub fn default_path(vault: &Path) -> PathBuf {
        vault
            .join(".obsidian")
            .join("plugins")
            .join("inbox-processor")
            .join("data.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;

        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", self.path.display()))?;

        Ok(Some(settings))
    }

    /// Save settings (with advisory file locking)
    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        // Use a lockfile to prevent concurrent writes
        let lock_path = self.path.with_extension("json.lock");
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

        use fs2::FileExt;
        lock_file
            .lock_exclusive()
            .with_context(|| "Failed to acquire settings file lock")?;

        let result = std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()));

        let _ = lock_file.unlock();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::for_vault(dir.path());

        assert!(store.load().unwrap().is_none());
        assert_eq!(Settings::load_from(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_edit_persists() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::for_vault(dir.path());
        let mut settings = Settings::default();

        settings
            .edit(&store, |s| {
                s.interval = Some(30);
                s.rules = vec![Rule::new("pdf", "Docs")];
            })
            .unwrap();

        let loaded = Settings::load_from(&store).unwrap();
        assert_eq!(loaded, settings);
        assert!(store.path().ends_with(".obsidian/plugins/inbox-processor/data.json"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(JsonSettingsStore::new(path).load().is_err());
    }
}
