use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::errors::{RegistrationError, Result};
use crate::form::ActivityCatalog;
use crate::utils::persistence::{load_json, save_json_atomic};

const DEFAULT_DIR_NAME: &str = ".registration_core";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.registration_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("REGISTRATION_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Terminal output switches, mirrored into the CLI output helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub quiet_mode: bool,
    pub high_contrast_mode: bool,
    pub screen_reader_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON activity catalog replacing the built-in conference schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Re-render the form after every interactive command.
    pub render_after_command: bool,
    pub output: OutputSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            render_after_command: true,
            output: OutputSettings::default(),
        }
    }
}

impl Config {
    /// Resolves the activity catalog this configuration points at.
    pub fn load_catalog(&self) -> Result<ActivityCatalog> {
        match &self.catalog_path {
            Some(path) => ActivityCatalog::load(path).map_err(|err| {
                RegistrationError::Config(format!(
                    "failed to load catalog `{}`: {}",
                    path.display(),
                    err
                ))
            }),
            None => Ok(ActivityCatalog::conference()),
        }
    }
}

/// Loads and stores [`Config`] under the application data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            path: config_dir.join(CONFIG_FILE),
        })
    }

    /// Missing file means defaults; a malformed file is an error.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        load_json(&self.path).map_err(|err| {
            RegistrationError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        save_json_atomic(config, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.render_after_command);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            catalog_path: Some(dir.path().join("catalog.json")),
            render_after_command: false,
            output: OutputSettings {
                quiet_mode: true,
                ..OutputSettings::default()
            },
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"output": {"quiet_mode": true}}"#).unwrap();
        let config = manager.load().unwrap();
        assert!(config.output.quiet_mode);
        assert!(config.render_after_command);
        assert_eq!(config.catalog_path, None);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{not json").unwrap();
        assert!(matches!(manager.load(), Err(RegistrationError::Config(_))));
    }

    #[test]
    fn catalog_path_overrides_conference_schedule() {
        let dir = tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        fs::write(
            &catalog_path,
            r#"{"activities": [{"id": "solo", "display_name": "Solo", "cost": 5}]}"#,
        )
        .unwrap();
        let config = Config {
            catalog_path: Some(catalog_path),
            ..Config::default()
        };
        assert_eq!(config.load_catalog().unwrap().len(), 1);

        let overflowing_path = dir.path().join("overflow.json");
        fs::write(
            &overflowing_path,
            r#"{"activities": [
                {"id": "a", "display_name": "A", "cost": 3000000000},
                {"id": "b", "display_name": "B", "cost": 3000000000}
            ]}"#,
        )
        .unwrap();
        let overflowing = Config {
            catalog_path: Some(overflowing_path),
            ..Config::default()
        };
        assert!(matches!(
            overflowing.load_catalog(),
            Err(RegistrationError::Config(_))
        ));

        let missing = Config {
            catalog_path: Some(dir.path().join("absent.json")),
            ..Config::default()
        };
        assert!(matches!(
            missing.load_catalog(),
            Err(RegistrationError::Config(_))
        ));
    }
}
