//! High-level operations.
//!
//! This module contains the implementation of cordsync commands.

pub mod config_store;
pub mod gradle_wrapper;
pub mod manifest_sync;

pub use config_store::{
    ApplyOutcome, ConfigEdit, ConfigStore, DisplayExtras, EditableField, MergedConfigView,
};
pub use gradle_wrapper::{pin_gradle_wrapper, PinOutcome};
pub use manifest_sync::{HookState, ManifestSyncHook, StepStatus, SyncReport, SyncStep};
