//! cordsync - keeps a Cordova project's descriptor and generated Android
//! platform files consistent.
//!
//! This crate provides the library side of the `cordsync` CLI: the
//! `config.xml` codec, the text patches applied to `build.gradle`,
//! `AndroidManifest.xml` and `themes.xml`, the design-time configuration
//! store and the build-time sync hook.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for cordsync unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use core::{
    artifact::Artifact, artifact::FileArtifact, descriptor::ProjectDescriptor,
    project::ProjectLayout, SyncError,
};
pub use ops::{ConfigEdit, ConfigStore, ManifestSyncHook, MergedConfigView};
pub use util::context::GlobalContext;
