//! Design-time view and editing of project configuration.
//!
//! `config.xml` is authoritative. `build.gradle` is optional and only
//! consulted when the descriptor lacks a value; edits are committed to the
//! descriptor first and propagated to the build script on a best-effort
//! basis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::artifact::{self, Artifact, FileArtifact};
use crate::core::build_script::{self, BuildScriptFacts};
use crate::core::descriptor::{self, Orientation, ProjectDescriptor};
use crate::core::project::ProjectLayout;
use crate::core::{android_manifest, SyncError};

/// Value shown when no artifact provides a field.
pub const UNKNOWN: &str = "unknown";

/// Permissions every generated project requests.
pub const DEFAULT_PERMISSIONS: &[&str] = &[
    "android.permission.INTERNET",
    "android.permission.ACCESS_NETWORK_STATE",
    "android.permission.VIBRATE",
];

/// Keystore file name expected in the project root.
pub const KEYSTORE_FILE: &str = "package.keystore";

/// Read-only, precedence-resolved projection of the project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedConfigView {
    /// Descriptor `id`, else build script `applicationId`
    pub package_name: String,
    pub version_name: String,
    /// Descriptor version code, else build script `versionCode`
    pub version_code: String,
    pub descriptor: ProjectDescriptor,
    /// `None` when no build script was available
    pub build_script: Option<BuildScriptFacts>,
    pub extras: DisplayExtras,
}

impl MergedConfigView {
    /// Combine descriptor and build script facts.
    ///
    /// The descriptor wins; build script facts fill gaps; [`UNKNOWN`]
    /// applies only when both lack a field.
    pub fn merge(
        descriptor: ProjectDescriptor,
        build_script: Option<BuildScriptFacts>,
        extras: DisplayExtras,
    ) -> Self {
        let facts = build_script.as_ref();
        MergedConfigView {
            package_name: resolve(
                &descriptor.id,
                facts.and_then(|f| f.application_id.as_deref()),
            ),
            version_name: resolve(&descriptor.version_name, None),
            version_code: resolve(
                &descriptor.version_code,
                facts.and_then(|f| f.version_code.as_deref()),
            ),
            descriptor,
            build_script,
            extras,
        }
    }
}

fn resolve(primary: &str, fallback: Option<&str>) -> String {
    if !primary.is_empty() {
        return primary.to_string();
    }
    match fallback {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Informational values shown alongside the editable fields. Never written
/// back to any artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayExtras {
    pub permissions: Vec<String>,
    pub signing: SigningInfo,
    pub native_alignment: NativeAlignment,
    pub hardware_accelerated: bool,
    /// Icon sources keyed by `WIDTHxHEIGHT`
    pub icons: BTreeMap<String, String>,
}

impl Default for DisplayExtras {
    fn default() -> Self {
        DisplayExtras {
            permissions: DEFAULT_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
            signing: SigningInfo::default(),
            native_alignment: NativeAlignment::from_extract_native_libs("false"),
            hardware_accelerated: true,
            icons: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningInfo {
    pub keystore_file: String,
    pub keystore_exists: bool,
    pub key_alias: Option<String>,
    pub store_password: String,
    pub key_password: String,
}

impl Default for SigningInfo {
    fn default() -> Self {
        SigningInfo {
            keystore_file: KEYSTORE_FILE.to_string(),
            keystore_exists: false,
            key_alias: None,
            store_password: "***".to_string(),
            key_password: "***".to_string(),
        }
    }
}

/// 16 KB native library page alignment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeAlignment {
    pub extract_native_libs: String,
    /// Alignment holds when native libraries are not extracted
    pub enabled: bool,
}

impl NativeAlignment {
    pub fn from_extract_native_libs(value: &str) -> Self {
        NativeAlignment {
            extract_native_libs: value.to_string(),
            enabled: value == "false",
        }
    }
}

/// Fields an edit may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditableField {
    Id,
    VersionName,
    VersionCode,
    DisplayName,
    Description,
    Author,
    EntryContent,
    Orientation,
}

impl EditableField {
    pub const ALL: [EditableField; 8] = [
        EditableField::Id,
        EditableField::VersionName,
        EditableField::VersionCode,
        EditableField::DisplayName,
        EditableField::Description,
        EditableField::Author,
        EditableField::EntryContent,
        EditableField::Orientation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EditableField::Id => "id",
            EditableField::VersionName => "versionName",
            EditableField::VersionCode => "versionCode",
            EditableField::DisplayName => "displayName",
            EditableField::Description => "description",
            EditableField::Author => "author",
            EditableField::EntryContent => "entryContent",
            EditableField::Orientation => "orientation",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditableField {
    type Err = SyncError;

    /// Accepts camelCase, kebab-case and snake_case spellings, plus the
    /// descriptor's own names (`version`, `name`, `content`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "id" => Ok(EditableField::Id),
            "versionname" | "version" => Ok(EditableField::VersionName),
            "versioncode" => Ok(EditableField::VersionCode),
            "displayname" | "name" => Ok(EditableField::DisplayName),
            "description" => Ok(EditableField::Description),
            "author" => Ok(EditableField::Author),
            "entrycontent" | "content" => Ok(EditableField::EntryContent),
            "orientation" => Ok(EditableField::Orientation),
            _ => Err(SyncError::UnknownField {
                field: s.to_string(),
            }),
        }
    }
}

/// A set of field assignments restricted to [`EditableField`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEdit {
    fields: BTreeMap<EditableField, String>,
}

impl ConfigEdit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment.
    pub fn set(mut self, field: EditableField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: EditableField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: EditableField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn touched(&self) -> BTreeSet<EditableField> {
        self.fields.keys().copied().collect()
    }

    /// Build an edit from `(key, value)` pairs, rejecting unknown keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut edit = ConfigEdit::new();
        for (key, value) in pairs {
            let field = key.as_ref().parse()?;
            let value = value.into();
            check_value(field, &value)?;
            edit.insert(field, value);
        }
        Ok(edit)
    }

    /// Parse a single `key=value` assignment.
    pub fn parse_assignment(assignment: &str) -> Result<(EditableField, String), SyncError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| SyncError::InvalidEdit {
                field: assignment.to_string(),
                reason: "expected KEY=VALUE".to_string(),
            })?;
        let field = key.parse()?;
        check_value(field, value)?;
        Ok((field, value.to_string()))
    }

    /// Overlay this edit onto a descriptor.
    pub fn apply_to(&self, base: &ProjectDescriptor) -> Result<ProjectDescriptor, SyncError> {
        let mut out = base.clone();
        for (field, value) in &self.fields {
            match field {
                EditableField::Id | EditableField::VersionName if value.trim().is_empty() => {
                    return Err(SyncError::InvalidEdit {
                        field: field.to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
                EditableField::Id => out.id = value.clone(),
                EditableField::VersionName => out.version_name = value.clone(),
                EditableField::VersionCode => out.version_code = value.trim().to_string(),
                // The codec trims element text, so store what a re-read yields.
                EditableField::DisplayName => out.display_name = value.trim().to_string(),
                EditableField::Description => out.description = value.trim().to_string(),
                EditableField::Author => out.author = value.trim().to_string(),
                EditableField::EntryContent => out.entry_content = value.clone(),
                EditableField::Orientation => {
                    out.orientation = value.parse::<Orientation>().map_err(|reason| {
                        SyncError::InvalidEdit {
                            field: field.to_string(),
                            reason,
                        }
                    })?;
                }
            }
        }
        Ok(out)
    }
}

/// Values with a closed vocabulary are rejected when the edit is built.
fn check_value(field: EditableField, value: &str) -> Result<(), SyncError> {
    if field == EditableField::Orientation {
        value
            .parse::<Orientation>()
            .map_err(|reason| SyncError::InvalidEdit {
                field: field.to_string(),
                reason,
            })?;
    }
    Ok(())
}

/// Successful result of [`ConfigStore::apply_edit`]. The descriptor is
/// always saved.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// Descriptor saved; build script patched if `build_script_updated`.
    Saved {
        descriptor: ProjectDescriptor,
        build_script_updated: bool,
    },
    /// Descriptor saved, but the secondary write failed.
    SavedWithWarning {
        descriptor: ProjectDescriptor,
        warning: SyncError,
    },
}

impl ApplyOutcome {
    pub fn descriptor(&self) -> &ProjectDescriptor {
        match self {
            ApplyOutcome::Saved { descriptor, .. } => descriptor,
            ApplyOutcome::SavedWithWarning { descriptor, .. } => descriptor,
        }
    }

    pub fn warning(&self) -> Option<&SyncError> {
        match self {
            ApplyOutcome::Saved { .. } => None,
            ApplyOutcome::SavedWithWarning { warning, .. } => Some(warning),
        }
    }

    /// One human-readable line describing what was saved.
    pub fn message(&self) -> String {
        match self {
            ApplyOutcome::Saved {
                build_script_updated: true,
                descriptor,
            } => format!(
                "config.xml saved; build.gradle versionCode set to {}",
                descriptor.version_code
            ),
            ApplyOutcome::Saved { .. } => "config.xml saved".to_string(),
            ApplyOutcome::SavedWithWarning { warning, .. } => format!(
                "config.xml saved, but build.gradle was not updated: {}",
                warning
            ),
        }
    }
}

/// Message for an `apply_edit` call that saved nothing.
pub fn failure_message(err: &SyncError) -> String {
    match err.root_cause() {
        root if std::ptr::eq(root, err) => format!("nothing saved: {}", err),
        root => format!("nothing saved: {}: {}", err, root),
    }
}

/// Holds the artifact handles of one editing session. Configuration values
/// are never cached; every call re-reads the artifacts.
#[derive(Debug)]
pub struct ConfigStore {
    descriptor: Option<Box<dyn Artifact>>,
    build_script: Option<Box<dyn Artifact>>,
    manifest: Option<Box<dyn Artifact>>,
    keystore_exists: bool,
}

impl ConfigStore {
    pub fn new(
        descriptor: Option<Box<dyn Artifact>>,
        build_script: Option<Box<dyn Artifact>>,
    ) -> Self {
        ConfigStore {
            descriptor,
            build_script,
            manifest: None,
            keystore_exists: false,
        }
    }

    /// Open file handles for a project. A build script that does not exist
    /// is treated as absent.
    pub fn open(layout: &ProjectLayout) -> Self {
        let build_script =
            artifact::existing(&layout.build_script).map(|a| Box::new(a) as Box<dyn Artifact>);
        let manifest =
            artifact::existing(&layout.manifest).map(|a| Box::new(a) as Box<dyn Artifact>);

        ConfigStore {
            descriptor: Some(Box::new(FileArtifact::new(&layout.descriptor))),
            build_script,
            manifest,
            keystore_exists: layout.keystore.is_file(),
        }
    }

    /// Attach a platform manifest used only for display values.
    pub fn with_manifest(mut self, manifest: Option<Box<dyn Artifact>>) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_keystore(mut self, exists: bool) -> Self {
        self.keystore_exists = exists;
        self
    }

    pub fn has_build_script(&self) -> bool {
        self.build_script.is_some()
    }

    /// Load the merged view.
    ///
    /// Fails only when the descriptor is missing or unparsable.
    pub fn load(&self) -> Result<MergedConfigView, SyncError> {
        let text = self.read_descriptor_text()?;
        let parsed = descriptor::parse(&text).map_err(SyncError::descriptor_required)?;
        let icons = descriptor::icons(&text).unwrap_or_default();
        let facts = self.read_build_script_facts();
        let extras = self.display_extras(facts.as_ref(), icons);

        tracing::debug!(
            "loaded {} (build script: {})",
            parsed.id,
            if facts.is_some() { "present" } else { "absent" }
        );
        Ok(MergedConfigView::merge(parsed, facts, extras))
    }

    /// Apply an edit.
    ///
    /// The regenerated descriptor is written first and is the commit point.
    /// The build script's `versionCode` is then patched if a build script is
    /// attached; a failure there is returned as a warning and never rolls
    /// back the descriptor.
    pub fn apply_edit(&self, edit: &ConfigEdit) -> Result<ApplyOutcome, SyncError> {
        let handle = self.descriptor_handle()?;
        let text = self.read_descriptor_text()?;
        let current = descriptor::parse(&text).map_err(SyncError::descriptor_required)?;
        let updated = edit.apply_to(&current)?;

        handle.write_text(&descriptor::generate(&updated))?;
        tracing::info!("saved {}", handle.name());

        let Some(build_script) = self.build_script.as_deref() else {
            return Ok(ApplyOutcome::Saved {
                descriptor: updated,
                build_script_updated: false,
            });
        };
        if updated.version_code.is_empty() {
            tracing::debug!("no version code to propagate to {}", build_script.name());
            return Ok(ApplyOutcome::Saved {
                descriptor: updated,
                build_script_updated: false,
            });
        }

        match patch_build_script(build_script, &updated.version_code) {
            Ok(changed) => Ok(ApplyOutcome::Saved {
                descriptor: updated,
                build_script_updated: changed,
            }),
            Err(warning) => {
                tracing::warn!("{} not updated: {}", build_script.name(), warning);
                Ok(ApplyOutcome::SavedWithWarning {
                    descriptor: updated,
                    warning,
                })
            }
        }
    }

    fn descriptor_handle(&self) -> Result<&dyn Artifact, SyncError> {
        self.descriptor.as_deref().ok_or_else(|| {
            SyncError::descriptor_required(SyncError::ArtifactMissing {
                artifact: crate::core::DESCRIPTOR_FILE.to_string(),
            })
        })
    }

    fn read_descriptor_text(&self) -> Result<String, SyncError> {
        self.descriptor_handle()?
            .read_text()
            .map_err(SyncError::descriptor_required)
    }

    fn read_build_script_facts(&self) -> Option<BuildScriptFacts> {
        let handle = self.build_script.as_deref()?;
        match handle.read_text() {
            Ok(text) => Some(build_script::extract(&text)),
            Err(e) => {
                tracing::warn!("ignoring unreadable build script: {}", e);
                None
            }
        }
    }

    fn display_extras(
        &self,
        facts: Option<&BuildScriptFacts>,
        icons: BTreeMap<String, String>,
    ) -> DisplayExtras {
        let mut extras = DisplayExtras {
            icons,
            ..DisplayExtras::default()
        };
        extras.signing.keystore_exists = self.keystore_exists;
        extras.signing.key_alias = facts.and_then(|f| f.key_alias.clone());

        let manifest_text = self
            .manifest
            .as_deref()
            .and_then(|m| m.read_text().ok());
        if let Some(text) = manifest_text {
            for permission in android_manifest::declared_permissions(&text) {
                if !extras.permissions.contains(&permission) {
                    extras.permissions.push(permission);
                }
            }
            if let Some(value) = android_manifest::extract_native_libs(&text) {
                extras.native_alignment = NativeAlignment::from_extract_native_libs(&value);
            }
        }
        extras
    }
}

/// Patch the build script's version code. Returns whether the file changed.
fn patch_build_script(handle: &dyn Artifact, version_code: &str) -> Result<bool, SyncError> {
    let text = handle.read_text()?;
    let patched = build_script::patch_version_code(&text, version_code)?;
    if patched == text {
        return Ok(false);
    }
    handle.write_text(&patched)?;
    tracing::info!("set versionCode {} in {}", version_code, handle.name());
    Ok(true)
}
