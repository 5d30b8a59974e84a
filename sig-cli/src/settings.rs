//! Application settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sig_stream::{DEFAULT_MAX_FILES, DEFAULT_MAX_LINES};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Suppress pager messages that do not look like human text
    #[serde(default)]
    pub paging_filter: bool,
    /// Directory receiving service mode logs
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log files kept before the oldest are removed
    #[serde(default = "default_max_files")]
    pub max_stored_files: usize,
    /// Lines per log file before rotation
    #[serde(default = "default_max_lines")]
    pub max_lines_per_file: usize,
}

fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("sigline"))
        .unwrap_or_else(|| PathBuf::from("sigline-logs"))
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paging_filter: false,
            log_dir: default_log_dir(),
            max_stored_files: DEFAULT_MAX_FILES,
            max_lines_per_file: DEFAULT_MAX_LINES,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for sigline
    /// Uses $XDG_CONFIG_HOME/sigline on Linux/macOS, falls back to ~/.config/sigline
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("sigline"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("sigline"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|s| Self::from_json(&s))
            .unwrap_or_default()
    }

    fn from_json(s: &str) -> Option<Self> {
        match serde_json::from_str(s) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Ignoring invalid settings file: {}", e);
                None
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        use anyhow::Context;

        let path = Self::settings_path().context("Could not determine settings path")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }
}
