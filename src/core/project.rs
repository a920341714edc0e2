//! Project layout - where each artifact lives.
//!
//! A project is a directory containing `config.xml`. All other artifacts are
//! located relative to it and may be overridden through the tool config.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::SyncError;
use crate::util::config::PathsConfig;

/// File name of the project descriptor.
pub const DESCRIPTOR_FILE: &str = "config.xml";

/// The artifacts the synchronizer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Descriptor,
    BuildScript,
    Manifest,
    Themes,
    SplashSource,
    GradleWrapper,
    Keystore,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Descriptor => "config.xml",
            ArtifactKind::BuildScript => "build.gradle",
            ArtifactKind::Manifest => "AndroidManifest.xml",
            ArtifactKind::Themes => "themes.xml",
            ArtifactKind::SplashSource => "splash image",
            ArtifactKind::GradleWrapper => "gradle-wrapper.properties",
            ArtifactKind::Keystore => "package.keystore",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved artifact paths for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    pub descriptor: PathBuf,
    pub build_script: PathBuf,
    pub manifest: PathBuf,
    pub themes: PathBuf,
    pub splash_source: PathBuf,
    pub splash_dest: PathBuf,
    pub gradle_wrapper: PathBuf,
    pub keystore: PathBuf,
}

impl ProjectLayout {
    /// Default Cordova/Android layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let android = root.join("platforms").join("android");
        let main = android.join("app").join("src").join("main");

        ProjectLayout {
            descriptor: root.join(DESCRIPTOR_FILE),
            build_script: android.join("app").join("build.gradle"),
            manifest: main.join("AndroidManifest.xml"),
            themes: main.join("res").join("values").join("themes.xml"),
            splash_source: root.join("www").join("img").join("1125x2436.png"),
            splash_dest: main.join("res").join("drawable").join("splash.png"),
            gradle_wrapper: android
                .join("gradle")
                .join("wrapper")
                .join("gradle-wrapper.properties"),
            keystore: root.join("package.keystore"),
            root,
        }
    }

    /// Default layout with configured path overrides applied.
    ///
    /// Relative overrides are resolved against the project root.
    pub fn with_overrides(root: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        let mut layout = Self::new(root);
        let root = layout.root.clone();
        let resolve = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        };

        if let Some(p) = &paths.descriptor {
            layout.descriptor = resolve(p);
        }
        if let Some(p) = &paths.build_script {
            layout.build_script = resolve(p);
        }
        if let Some(p) = &paths.manifest {
            layout.manifest = resolve(p);
        }
        if let Some(p) = &paths.themes {
            layout.themes = resolve(p);
        }
        if let Some(p) = &paths.splash_source {
            layout.splash_source = resolve(p);
        }
        if let Some(p) = &paths.splash_dest {
            layout.splash_dest = resolve(p);
        }
        if let Some(p) = &paths.gradle_wrapper {
            layout.gradle_wrapper = resolve(p);
        }
        layout
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a given artifact.
    pub fn path_of(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Descriptor => &self.descriptor,
            ArtifactKind::BuildScript => &self.build_script,
            ArtifactKind::Manifest => &self.manifest,
            ArtifactKind::Themes => &self.themes,
            ArtifactKind::SplashSource => &self.splash_source,
            ArtifactKind::GradleWrapper => &self.gradle_wrapper,
            ArtifactKind::Keystore => &self.keystore,
        }
    }

    /// Check which artifacts are present. Read-only.
    pub fn scan(&self) -> ScanReport {
        let entries = [
            (ArtifactKind::Descriptor, true),
            (ArtifactKind::BuildScript, false),
            (ArtifactKind::Manifest, false),
            (ArtifactKind::Themes, false),
            (ArtifactKind::SplashSource, false),
            (ArtifactKind::GradleWrapper, false),
        ]
        .into_iter()
        .map(|(kind, required)| {
            let path = self.path_of(kind).to_path_buf();
            ScanEntry {
                kind,
                found: path.is_file(),
                path,
                required,
            }
        })
        .collect();

        ScanReport { entries }
    }
}

/// One line of a project scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanEntry {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub found: bool,
    pub required: bool,
}

/// Result of [`ProjectLayout::scan`].
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub entries: Vec<ScanEntry>,
}

impl ScanReport {
    pub fn is_found(&self, kind: ArtifactKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind && e.found)
    }

    /// Fail when a required artifact is missing.
    pub fn ensure_required(&self) -> Result<(), SyncError> {
        match self.entries.iter().find(|e| e.required && !e.found) {
            Some(missing) => Err(SyncError::ArtifactMissing {
                artifact: missing.path.display().to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Search `start` and its ancestors for a directory holding `config.xml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(DESCRIPTOR_FILE).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let layout = ProjectLayout::new("/proj");
        assert_eq!(layout.descriptor, PathBuf::from("/proj/config.xml"));
        assert_eq!(
            layout.build_script,
            PathBuf::from("/proj/platforms/android/app/build.gradle")
        );
        assert_eq!(
            layout.manifest,
            PathBuf::from("/proj/platforms/android/app/src/main/AndroidManifest.xml")
        );
        assert_eq!(
            layout.splash_dest,
            PathBuf::from("/proj/platforms/android/app/src/main/res/drawable/splash.png")
        );
    }

    #[test]
    fn test_overrides_resolve_relative_paths() {
        let paths = PathsConfig {
            build_script: Some(PathBuf::from("android/app/build.gradle")),
            splash_source: Some(PathBuf::from("/abs/splash.png")),
            ..PathsConfig::default()
        };
        let layout = ProjectLayout::with_overrides("/proj", &paths);
        assert_eq!(
            layout.build_script,
            PathBuf::from("/proj/android/app/build.gradle")
        );
        assert_eq!(layout.splash_source, PathBuf::from("/abs/splash.png"));
        assert_eq!(layout.descriptor, PathBuf::from("/proj/config.xml"));
    }

    #[test]
    fn test_scan_reports_optional_build_script() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.xml"), "<widget/>").unwrap();

        let report = ProjectLayout::new(tmp.path()).scan();
        assert!(report.is_found(ArtifactKind::Descriptor));
        assert!(!report.is_found(ArtifactKind::BuildScript));
        assert!(report.ensure_required().is_ok());
    }

    #[test]
    fn test_scan_without_descriptor_fails() {
        let tmp = TempDir::new().unwrap();
        let report = ProjectLayout::new(tmp.path()).scan();
        assert!(matches!(
            report.ensure_required(),
            Err(SyncError::ArtifactMissing { .. })
        ));
    }

    #[test]
    fn test_find_project_root_searches_upward() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.xml"), "<widget/>").unwrap();
        let nested = tmp.path().join("www").join("js");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(tmp.path().to_path_buf()));
    }
}
