//! Build-time synchronization of the generated Android platform files.
//!
//! Run after `cordova prepare`. Four independent steps bring the theme
//! resource, splash drawable and platform manifest in line with `config.xml`.
//! A failing step never stops the ones after it, and every step detects its
//! own prior work so repeated runs leave the files byte-identical.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::artifact::{Artifact, FileArtifact};
use crate::core::project::ProjectLayout;
use crate::core::{android_manifest, descriptor, theme, SyncError};
use crate::util::fs;

/// The hook steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStep {
    ThemeInjection,
    SplashCopy,
    ActivityTheme,
    VersionSync,
}

impl SyncStep {
    pub const ALL: [SyncStep; 4] = [
        SyncStep::ThemeInjection,
        SyncStep::SplashCopy,
        SyncStep::ActivityTheme,
        SyncStep::VersionSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStep::ThemeInjection => "theme-injection",
            SyncStep::SplashCopy => "splash-copy",
            SyncStep::ActivityTheme => "activity-theme",
            SyncStep::VersionSync => "version-sync",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one step did.
#[derive(Debug)]
pub enum StepStatus {
    /// A file was written; the detail says which.
    Applied(String),
    /// The files already held the expected content.
    Unchanged,
    /// Preconditions were not met; nothing was touched.
    Skipped(String),
    Failed(SyncError),
}

impl StepStatus {
    pub fn kind(&self) -> &'static str {
        match self {
            StepStatus::Applied(_) => "applied",
            StepStatus::Unchanged => "unchanged",
            StepStatus::Skipped(_) => "skipped",
            StepStatus::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepStatus::Failed(_))
    }

    /// Detail text for display; empty for `Unchanged`.
    pub fn detail(&self) -> String {
        match self {
            StepStatus::Applied(detail) | StepStatus::Skipped(detail) => detail.clone(),
            StepStatus::Unchanged => String::new(),
            StepStatus::Failed(err) => err.to_string(),
        }
    }
}

/// Terminal state of a hook run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookState {
    Completed,
    PartiallyFailed,
}

impl fmt::Display for HookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookState::Completed => f.write_str("completed"),
            HookState::PartiallyFailed => f.write_str("partially failed"),
        }
    }
}

#[derive(Debug)]
pub struct StepOutcome {
    pub step: SyncStep,
    pub status: StepStatus,
}

/// Per-step results of one hook run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub steps: Vec<StepOutcome>,
}

impl SyncReport {
    pub fn state(&self) -> HookState {
        if self.steps.iter().any(|s| s.status.is_failed()) {
            HookState::PartiallyFailed
        } else {
            HookState::Completed
        }
    }

    pub fn status_of(&self, step: SyncStep) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|s| s.step == step)
            .map(|s| &s.status)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.status.is_failed())
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> serde_json::Value {
        let steps: Vec<_> = self
            .steps
            .iter()
            .map(|s| {
                serde_json::json!({
                    "step": s.step,
                    "status": s.status.kind(),
                    "detail": s.status.detail(),
                })
            })
            .collect();
        serde_json::json!({
            "reason": "sync-report",
            "state": self.state(),
            "steps": steps,
        })
    }
}

/// The post-prepare hook for one project.
#[derive(Debug)]
pub struct ManifestSyncHook {
    descriptor: Box<dyn Artifact>,
    manifest: Box<dyn Artifact>,
    themes: Box<dyn Artifact>,
    splash_source: PathBuf,
    splash_dest: PathBuf,
}

impl ManifestSyncHook {
    pub fn new(layout: &ProjectLayout) -> Self {
        ManifestSyncHook {
            descriptor: Box::new(FileArtifact::new(&layout.descriptor)),
            manifest: Box::new(FileArtifact::new(&layout.manifest)),
            themes: Box::new(FileArtifact::new(&layout.themes)),
            splash_source: layout.splash_source.clone(),
            splash_dest: layout.splash_dest.clone(),
        }
    }

    /// Run every step. Never fails as a whole; see [`SyncReport::state`].
    pub fn run(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for step in SyncStep::ALL {
            let result = match step {
                SyncStep::ThemeInjection => inject_theme(self.themes.as_ref()),
                SyncStep::SplashCopy => copy_splash(&self.splash_source, &self.splash_dest),
                SyncStep::ActivityTheme => bind_theme(self.manifest.as_ref()),
                SyncStep::VersionSync => {
                    sync_versions(self.descriptor.as_ref(), self.manifest.as_ref())
                }
            };

            let status = match result {
                Ok(status) => status,
                Err(SyncError::InjectionSkipped { reason, .. }) => {
                    tracing::warn!("{} skipped: {}", step, reason);
                    StepStatus::Skipped(reason)
                }
                Err(err) => {
                    tracing::warn!("{} failed: {}", step, err);
                    StepStatus::Failed(err)
                }
            };
            tracing::debug!("{}: {}", step, status.kind());
            report.steps.push(StepOutcome { step, status });
        }

        tracing::info!("manifest sync {}", report.state());
        report
    }
}

fn write_if_changed(
    artifact: &dyn Artifact,
    before: &str,
    after: &str,
    detail: impl FnOnce() -> String,
) -> Result<StepStatus, SyncError> {
    if before == after {
        return Ok(StepStatus::Unchanged);
    }
    artifact.write_text(after)?;
    Ok(StepStatus::Applied(detail()))
}

/// Add the starting theme style, creating the resource file if needed.
pub fn inject_theme(themes: &dyn Artifact) -> Result<StepStatus, SyncError> {
    if !themes.exists() {
        themes.write_text(&theme::theme_template())?;
        return Ok(StepStatus::Applied(format!("created {}", themes.name())));
    }

    let text = themes.read_text()?;
    if theme::has_starting_theme(&text) {
        return Ok(StepStatus::Unchanged);
    }
    let patched = theme::inject_starting_theme(&text)?;
    write_if_changed(themes, &text, &patched, || {
        format!("added {} to {}", theme::STARTING_THEME, themes.name())
    })
}

/// Copy the splash image into the drawable directory.
pub fn copy_splash(source: &Path, dest: &Path) -> Result<StepStatus, SyncError> {
    if !source.is_file() {
        return Ok(StepStatus::Skipped(format!(
            "{} not found",
            source.display()
        )));
    }
    let copied = fs::copy_if_changed(source, dest)
        .map_err(|e| SyncError::io(dest.display().to_string(), e))?;
    if copied {
        Ok(StepStatus::Applied(format!("copied to {}", dest.display())))
    } else {
        Ok(StepStatus::Unchanged)
    }
}

/// Point the main activity at the starting theme.
pub fn bind_theme(manifest: &dyn Artifact) -> Result<StepStatus, SyncError> {
    if !manifest.exists() {
        return Ok(StepStatus::Skipped(format!("{} not found", manifest.name())));
    }
    let text = manifest.read_text()?;
    let patched = android_manifest::bind_activity_theme(&text)?;
    write_if_changed(manifest, &text, &patched, || {
        format!(
            "{} uses {}",
            android_manifest::MAIN_ACTIVITY,
            theme::STARTING_THEME_REF
        )
    })
}

/// Copy version name and code from the descriptor onto the manifest root.
pub fn sync_versions(
    descriptor: &dyn Artifact,
    manifest: &dyn Artifact,
) -> Result<StepStatus, SyncError> {
    if !manifest.exists() {
        return Ok(StepStatus::Skipped(format!("{} not found", manifest.name())));
    }
    let parsed = descriptor::parse(&descriptor.read_text()?)?;

    let text = manifest.read_text()?;
    let patched = android_manifest::sync_root_versions(
        &text,
        Some(parsed.version_name.as_str()),
        Some(parsed.version_code.as_str()),
    )?;
    write_if_changed(manifest, &text, &patched, || {
        let mut parts = Vec::new();
        if !parsed.version_name.is_empty() {
            parts.push(format!("versionName {}", parsed.version_name));
        }
        if !parsed.version_code.is_empty() {
            parts.push(format!("versionCode {}", parsed.version_code));
        }
        if parts.is_empty() {
            format!("cleaned root tag of {}", manifest.name())
        } else {
            parts.join(", ")
        }
    })
}
