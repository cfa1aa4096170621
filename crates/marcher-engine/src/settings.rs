//! Engine settings
//!
//! Stored in `{config_dir}/marcher/settings.json`. A missing or unreadable
//! file gives the defaults.

use anyhow::{Context, Result, bail};
use marcher_compiler::FlattenMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory holding the saved scene, `None` for the default location
    pub store_dir: Option<PathBuf>,
    /// How wide combinators are split while compiling
    pub flatten: FlattenMode,
    /// Keep the latest compiled expression for display
    pub publish_preview: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            store_dir: None,
            flatten: FlattenMode::InPlace,
            publish_preview: true,
        }
    }
}

impl EngineSettings {
    /// Configured store directory, falling back to the data directory
    pub fn resolved_store_dir(&self) -> Option<PathBuf> {
        self.store_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("marcher").join("scene")))
    }
}

/// Get the path to the settings file
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("marcher").join("settings.json"))
}

/// Load settings from disk, returning defaults if the file doesn't exist or is invalid
pub fn load_settings() -> EngineSettings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => EngineSettings::default(),
    }
}

pub fn load_settings_from(path: &Path) -> EngineSettings {
    if !path.exists() {
        return EngineSettings::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(%err, path = %path.display(), "invalid settings file, using defaults");
            EngineSettings::default()
        }),
        Err(_) => EngineSettings::default(),
    }
}

/// Save settings to disk
pub fn save_settings(settings: &EngineSettings) -> Result<()> {
    let Some(path) = settings_path() else {
        bail!("Could not determine config directory");
    };
    save_settings_to(settings, &path)
}

pub fn save_settings_to(settings: &EngineSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, json).context("Failed to write settings file")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("marcher_settings_{}_{}", name, std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = load_settings_from(&temp_path("missing"));
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("round_trip");
        let settings = EngineSettings {
            store_dir: Some(PathBuf::from("/tmp/scenes")),
            flatten: FlattenMode::Transient,
            publish_preview: false,
        };
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"transient\""));

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_partial_and_invalid_files() {
        let path = temp_path("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        fs::write(&path, r#"{"flatten": "transient"}"#).unwrap();
        let settings = load_settings_from(&path);
        assert_eq!(settings.flatten, FlattenMode::Transient);
        assert!(settings.publish_preview);

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(load_settings_from(&path), EngineSettings::default());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
