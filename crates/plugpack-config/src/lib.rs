//! Configuration for the plugpack CLI
//!
//! Settings live in a TOML file. The location can be overridden with the
//! `PLUGPACK_CONFIG` environment variable, which tests use to isolate runs.
//! A missing file means defaults for every key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "PLUGPACK_CONFIG";

pub const DEFAULT_EDITOR_TARGET_NAME: &str = "UE4Editor";
pub const DEFAULT_GAME_TARGET_NAME: &str = "UE4Game";

/// Platforms whose folders never ship in a redistributable package
pub const DEFAULT_RESTRICTED_PLATFORMS: &[&str] = &["PS4", "XboxOne"];

/// Folder names whose contents never ship in a redistributable package
pub const DEFAULT_RESTRICTED_FOLDERS: &[&str] =
    &["NotForLicensees", "NoRedist", "EpicInternal", "CarefullyRedist"];

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KEYS: &[&str] = &[
    "engine-dir",
    "project-dirs",
    "builder",
    "editor-target-name",
    "game-target-name",
    "restricted-platforms",
    "restricted-folders",
];

/// Error type for loading and saving configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, String),
    Serialize(String),
    UnknownKey(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "{}: {}", path.display(), e),
            ConfigError::Parse(path, msg) => {
                write!(f, "Failed to parse {}: {}", path.display(), msg)
            }
            ConfigError::Serialize(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {}. Supported keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Engine root; plugins are discovered under `<engine-dir>/Plugins`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_dir: Option<PathBuf>,
    /// Project roots; plugins are discovered under `<project>/Plugins`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_dirs: Vec<PathBuf>,
    /// Program invoked once per build target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_platforms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_folders: Option<Vec<String>>,
}

impl Config {
    /// Resolve the config file path
    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        dirs::config_dir().map_or_else(
            || PathBuf::from(".plugpack").join("plugpack.toml"),
            |dir| dir.join("plugpack").join("plugpack.toml"),
        )
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    pub fn editor_target_name(&self) -> &str {
        self.editor_target_name
            .as_deref()
            .unwrap_or(DEFAULT_EDITOR_TARGET_NAME)
    }

    pub fn game_target_name(&self) -> &str {
        self.game_target_name
            .as_deref()
            .unwrap_or(DEFAULT_GAME_TARGET_NAME)
    }

    pub fn restricted_platforms(&self) -> Vec<String> {
        self.restricted_platforms.clone().unwrap_or_else(|| {
            DEFAULT_RESTRICTED_PLATFORMS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn restricted_folders(&self) -> Vec<String> {
        self.restricted_folders.clone().unwrap_or_else(|| {
            DEFAULT_RESTRICTED_FOLDERS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "engine-dir" => self.engine_dir.as_ref().map(|p| p.display().to_string()),
            "project-dirs" => {
                if self.project_dirs.is_empty() {
                    None
                } else {
                    Some(join_paths(&self.project_dirs))
                }
            }
            "builder" => self.builder.clone(),
            "editor-target-name" => self.editor_target_name.clone(),
            "game-target-name" => self.game_target_name.clone(),
            "restricted-platforms" => self.restricted_platforms.as_ref().map(|v| v.join(",")),
            "restricted-folders" => self.restricted_folders.as_ref().map(|v| v.join(",")),
            _ => None,
        }
    }

    /// Set a key from its string form. List values are comma-separated.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "engine-dir" => self.engine_dir = Some(PathBuf::from(value)),
            "project-dirs" => {
                self.project_dirs = split_list(value).into_iter().map(PathBuf::from).collect();
            }
            "builder" => self.builder = Some(value.to_string()),
            "editor-target-name" => self.editor_target_name = Some(value.to_string()),
            "game-target-name" => self.game_target_name = Some(value.to_string()),
            "restricted-platforms" => self.restricted_platforms = Some(split_list(value)),
            "restricted-folders" => self.restricted_folders = Some(split_list(value)),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Config::default()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
