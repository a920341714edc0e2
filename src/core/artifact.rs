//! Artifact handles.
//!
//! An artifact is a named text file the synchronizer reads and writes.
//! Every call opens and closes the underlying file itself, so no handle keeps
//! a file descriptor alive between operations.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::error::SyncError;

/// Read/write access to one text artifact.
pub trait Artifact: fmt::Debug {
    /// Human-readable name used in messages (usually the file path).
    fn name(&self) -> &str;

    /// Whether the artifact currently exists.
    fn exists(&self) -> bool;

    /// Read the whole artifact as UTF-8 text.
    fn read_text(&self) -> Result<String, SyncError>;

    /// Replace the artifact contents.
    fn write_text(&self, text: &str) -> Result<(), SyncError>;
}

/// An artifact backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    path: PathBuf,
    name: String,
}

impl FileArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        FileArtifact { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Artifact for FileArtifact {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_text(&self) -> Result<String, SyncError> {
        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SyncError::ArtifactMissing {
                artifact: self.name.clone(),
            },
            _ => SyncError::io(&self.name, e),
        })
    }

    fn write_text(&self, text: &str) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SyncError::io(&self.name, e))?;
            }
        }
        fs::write(&self.path, text).map_err(|e| SyncError::io(&self.name, e))
    }
}

/// Open a file artifact only if it exists on disk.
pub fn existing(path: &Path) -> Option<FileArtifact> {
    let artifact = FileArtifact::new(path);
    artifact.exists().then_some(artifact)
}
