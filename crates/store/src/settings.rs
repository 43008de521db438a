//! Composer settings management
//!
//! Settings are stored as pretty-printed JSON next to other application data.
//! A corrupt file never blocks the composer: it is logged and defaults are used.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "composer_settings.json";

/// Main composer settings container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComposerSettings {
    /// Undo/redo history settings
    pub history: HistorySettings,
    /// Defaults offered for new tables
    pub tables: TableDefaults,
    /// Character/word counter settings
    pub counter: CounterSettings,
}

/// Undo/redo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of undoable transactions kept; older ones are dropped
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_entries: 100 }
    }
}

/// Defaults for the insert-table prompt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableDefaults {
    pub rows: usize,
    pub cols: usize,
    pub header_row: bool,
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            header_row: true,
        }
    }
}

/// Character/word counter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CounterSettings {
    /// Whether whitespace counts toward the character total
    pub count_whitespace: bool,
}

/// Settings manager for loading, saving, and updating composer settings
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: ComposerSettings,
}

impl SettingsManager {
    /// Create a new settings manager for the given data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: data_dir.as_ref().join(SETTINGS_FILE),
            current: ComposerSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or use defaults if the file is missing or corrupt
    pub fn load(&mut self) -> Result<&ComposerSettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<ComposerSettings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to parse composer settings, using defaults: {}", e);
                    ComposerSettings::default()
                }
            }
        } else {
            ComposerSettings::default()
        };
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &ComposerSettings {
        &self.current
    }

    /// Replace settings and save to disk
    pub fn update(&mut self, settings: ComposerSettings) -> Result<()> {
        self.current = settings;
        self.save()
    }

    /// Reset settings to defaults and save
    pub fn reset(&mut self) -> Result<&ComposerSettings> {
        self.current = ComposerSettings::default();
        self.save()?;
        Ok(&self.current)
    }
}
