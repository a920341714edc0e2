//! Core data structures for cordsync.
//!
//! This module contains the artifact-level building blocks:
//! - Artifact handles (read/write access to one file)
//! - The `config.xml` descriptor codec
//! - Text patches for `build.gradle`, `AndroidManifest.xml` and `themes.xml`
//! - Project layout discovery

pub mod android_manifest;
pub mod artifact;
pub mod build_script;
pub mod descriptor;
pub mod error;
pub mod project;
pub mod theme;

pub use artifact::{Artifact, FileArtifact};
pub use build_script::BuildScriptFacts;
pub use descriptor::{Orientation, ProjectDescriptor};
pub use error::SyncError;
pub use project::{find_project_root, ArtifactKind, ProjectLayout, ScanReport, DESCRIPTOR_FILE};
