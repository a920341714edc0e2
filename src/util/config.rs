//! Configuration file support for cordsync.
//!
//! cordsync supports two configuration file locations:
//! - Global: `~/.cordsync/config.toml` - User-wide defaults
//! - Project: `.cordsync/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Gradle version the wrapper is pinned to when nothing is configured.
pub const DEFAULT_GRADLE_VERSION: &str = "8.9";

/// cordsync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact path overrides
    pub paths: PathsConfig,

    /// Gradle wrapper settings
    pub wrapper: WrapperConfig,
}

/// Artifact path overrides. Relative paths are resolved against the
/// project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Project descriptor (default `config.xml`)
    pub descriptor: Option<PathBuf>,

    /// Generated build script
    pub build_script: Option<PathBuf>,

    /// Generated platform manifest
    pub manifest: Option<PathBuf>,

    /// Theme resource file
    pub themes: Option<PathBuf>,

    /// Splash image copied into the drawable directory
    pub splash_source: Option<PathBuf>,

    /// Destination of the splash image
    pub splash_dest: Option<PathBuf>,

    /// Gradle wrapper properties
    pub gradle_wrapper: Option<PathBuf>,
}

/// Gradle wrapper pin settings. Unset fields fall through to the next
/// config layer, then to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Gradle distribution version (e.g. "8.9")
    pub gradle_version: Option<String>,

    /// Pin the wrapper during `cordsync prepare`
    pub pin_on_prepare: Option<bool>,
}

impl WrapperConfig {
    pub fn gradle_version(&self) -> &str {
        self.gradle_version
            .as_deref()
            .unwrap_or(DEFAULT_GRADLE_VERSION)
    }

    pub fn pin_on_prepare(&self) -> bool {
        self.pin_on_prepare.unwrap_or(true)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one. Every field `other` sets wins.
    pub fn merge(&mut self, other: Config) {
        let paths = other.paths;
        if paths.descriptor.is_some() {
            self.paths.descriptor = paths.descriptor;
        }
        if paths.build_script.is_some() {
            self.paths.build_script = paths.build_script;
        }
        if paths.manifest.is_some() {
            self.paths.manifest = paths.manifest;
        }
        if paths.themes.is_some() {
            self.paths.themes = paths.themes;
        }
        if paths.splash_source.is_some() {
            self.paths.splash_source = paths.splash_source;
        }
        if paths.splash_dest.is_some() {
            self.paths.splash_dest = paths.splash_dest;
        }
        if paths.gradle_wrapper.is_some() {
            self.paths.gradle_wrapper = paths.gradle_wrapper;
        }

        if other.wrapper.gradle_version.is_some() {
            self.wrapper.gradle_version = other.wrapper.gradle_version;
        }
        if other.wrapper.pin_on_prepare.is_some() {
            self.wrapper.pin_on_prepare = other.wrapper.pin_on_prepare;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cordsync/config.toml)
/// 2. Global config (~/.cordsync/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global cordsync config directory (~/.cordsync).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cordsync"))
}

/// Get the global config path (~/.cordsync/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.cordsync/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".cordsync").join("config.toml")
}
