//! Configuration paths and persisted settings.
//!
//! Settings remember the last engine/level/mode, the image extensions scanned
//! in multi-file mode and the user's suffix edits per engine. They are stored
//! as JSON next to the log file.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::InputMode;
use crate::entities::keys::DEFAULT_EXTENSIONS;
use crate::entities::{Level, RenderEngine};

/// Settings file name
pub const SETTINGS_FILE: &str = "aov_compositor.json";
/// Log file name
pub const LOG_FILE: &str = "aov_compositor.log";
/// Environment override for the config directory
pub const CONFIG_DIR_ENV: &str = "AOV_COMPOSITOR_CONFIG_DIR";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (AOV_COMPOSITOR_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));

        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. AOV_COMPOSITOR_CONFIG_DIR environment variable
/// 3. Local folder IF a settings or log file exists there
/// 4. Platform-specific config directory from dirs-next (default)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_dir(config, dirs_next::config_dir()).join(name)
}

/// Get path to a data file (logs)
///
/// Same priority as [`config_file`], falling back to the platform data directory.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_dir(config, dirs_next::data_dir()).join(name)
}

fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn get_dir(config: &PathConfig, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }

    if let Some(dir) = platform_dir {
        return dir.join("aov_compositor");
    }

    PathBuf::from(".")
}

/// Persisted front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: RenderEngine,
    pub level: Level,
    pub mode: InputMode,
    /// Extensions scanned in multi-file mode
    pub extensions: Vec<String>,
    /// engine id -> (aov key -> suffix)
    pub suffix_overrides: IndexMap<String, IndexMap<String, String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: RenderEngine::default(),
            level: Level::default(),
            mode: InputMode::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            suffix_overrides: IndexMap::new(),
        }
    }
}

impl Settings {
    /// Load settings; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write settings: {}", path.display()))?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Suffix edits for one engine (empty if none)
    pub fn overrides(&self, engine: RenderEngine) -> IndexMap<String, String> {
        self.suffix_overrides
            .get(engine.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_override(&mut self, engine: RenderEngine, key: impl Into<String>, suffix: impl Into<String>) {
        self.suffix_overrides
            .entry(engine.as_str().to_string())
            .or_default()
            .insert(key.into(), suffix.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };

        assert_eq!(config_file(SETTINGS_FILE, &config), PathBuf::from("/custom/aov_compositor.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/aov_compositor.log"));
    }

    #[test]
    fn test_cli_dir_wins_over_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from_cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from_cli")));
    }

    #[test]
    fn test_settings_roundtrip_and_defaults() {
        let dir = std::env::temp_dir().join("aov_compositor_test_settings");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join(SETTINGS_FILE);

        assert_eq!(Settings::load(&path).unwrap(), Settings::default());

        let mut settings = Settings {
            engine: RenderEngine::VRay,
            mode: InputMode::Multi,
            ..Settings::default()
        };
        settings.set_override(RenderEngine::VRay, "reflection", "refl");
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.overrides(RenderEngine::VRay).get("reflection").map(String::as_str), Some("refl"));
        assert!(loaded.overrides(RenderEngine::Arnold).is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"engine": "vray", "level": "advanced"}"#).unwrap();
        assert_eq!(settings.engine, RenderEngine::VRay);
        assert_eq!(settings.level, Level::Advanced);
        assert_eq!(settings.mode, InputMode::Single);
        assert_eq!(settings.extensions, vec!["exr".to_string()]);
    }

    #[test]
    fn test_corrupt_settings_fail() {
        let path = std::env::temp_dir().join("aov_compositor_test_corrupt.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
