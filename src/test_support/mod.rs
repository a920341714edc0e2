//! Test utilities for cordsync unit tests.
//!
//! Provides an in-memory [`Artifact`] and on-disk project fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use cordsync::test_support::{fixtures, MemoryArtifact};
//!
//! let config = MemoryArtifact::new("config.xml", fixtures::CONFIG_XML);
//! let store = ConfigStore::new(Some(Box::new(config.clone())), None);
//! ```

pub mod fixtures;

use std::sync::{Arc, Mutex};

use crate::core::{Artifact, SyncError};

pub use fixtures::ProjectFixture;

/// In-memory artifact. Clones share contents, so a test can keep one clone
/// and hand another to the code under test.
#[derive(Debug, Clone)]
pub struct MemoryArtifact {
    name: String,
    contents: Arc<Mutex<Option<String>>>,
    read_only: bool,
    writes: Arc<Mutex<usize>>,
}

impl MemoryArtifact {
    pub fn new(name: &str, text: &str) -> Self {
        MemoryArtifact {
            name: name.to_string(),
            contents: Arc::new(Mutex::new(Some(text.to_string()))),
            read_only: false,
            writes: Arc::new(Mutex::new(0)),
        }
    }

    /// An artifact that does not exist yet.
    pub fn missing(name: &str) -> Self {
        MemoryArtifact {
            contents: Arc::new(Mutex::new(None)),
            ..Self::new(name, "")
        }
    }

    /// Reject every write with an I/O error.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().expect("artifact lock").clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().expect("write counter lock")
    }
}

impl Artifact for MemoryArtifact {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.contents().is_some()
    }

    fn read_text(&self) -> Result<String, SyncError> {
        self.contents().ok_or_else(|| SyncError::ArtifactMissing {
            artifact: self.name.clone(),
        })
    }

    fn write_text(&self, text: &str) -> Result<(), SyncError> {
        if self.read_only {
            return Err(SyncError::io(
                &self.name,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only artifact"),
            ));
        }
        *self.contents.lock().expect("artifact lock") = Some(text.to_string());
        *self.writes.lock().expect("write counter lock") += 1;
        Ok(())
    }
}

/// Create a temporary project from a fixture.
///
/// Returns the TempDir handle - dropping it will clean up the directory.
pub fn create_test_project(fixture: &ProjectFixture) -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().expect("failed to create temp dir");
    fixture
        .write_to(tmp.path())
        .expect("failed to write project fixture");
    tmp
}
