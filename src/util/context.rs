//! Global context for cordsync operations.
//!
//! Provides centralized access to the working directory, project root
//! discovery, and merged tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{find_project_root, ProjectLayout, DESCRIPTOR_FILE};
use crate::core::SyncError;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Project root given on the command line, if any
    project_root: Option<PathBuf>,

    /// Global config file (~/.cordsync/config.toml)
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            project_root: None,
            global_config: global_config_path(),
        }
    }

    /// Use an explicit project root instead of searching from cwd.
    pub fn with_project_root(mut self, root: Option<PathBuf>) -> Self {
        self.project_root = root.map(|r| if r.is_absolute() { r } else { self.cwd.join(r) });
        self
    }

    /// Override the global config location.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Find the project root (directory containing config.xml).
    ///
    /// An explicit root is returned as-is; otherwise cwd and its ancestors
    /// are searched.
    pub fn find_project_root(&self) -> Result<PathBuf, SyncError> {
        if let Some(root) = &self.project_root {
            return Ok(root.clone());
        }
        find_project_root(&self.cwd).ok_or_else(|| SyncError::ArtifactMissing {
            artifact: self.cwd.join(DESCRIPTOR_FILE).display().to_string(),
        })
    }

    /// Merged global + project configuration for a project root.
    pub fn config(&self, project_root: &Path) -> Config {
        load_config(
            self.global_config.as_deref(),
            &project_config_path(project_root),
        )
    }

    /// Resolve the project layout with configured overrides.
    pub fn layout(&self) -> Result<(ProjectLayout, Config), SyncError> {
        let root = self.find_project_root()?;
        let config = self.config(&root);
        let layout = ProjectLayout::with_overrides(root, &config.paths);
        tracing::debug!("project root: {}", layout.root().display());
        Ok((layout, config))
    }
}
