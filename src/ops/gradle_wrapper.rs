//! Pin the Gradle wrapper distribution of the generated platform.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::artifact::{Artifact, FileArtifact};
use crate::core::project::ProjectLayout;
use crate::core::SyncError;

static DISTRIBUTION_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^distributionUrl=[^\r\n]*").expect("valid distributionUrl pattern")
});

/// Result of a pin attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned { version: String },
    AlreadyPinned { version: String },
    /// The wrapper properties file does not exist.
    Missing,
}

/// Distribution line for a Gradle version, escaped the way the wrapper
/// writes it.
pub fn distribution_line(version: &str) -> String {
    format!(
        "distributionUrl=https\\://services.gradle.org/distributions/gradle-{}-all.zip",
        version
    )
}

/// Rewrite every `distributionUrl=` line to point at `version`.
pub fn pin_text(text: &str, version: &str) -> Result<String, SyncError> {
    if !DISTRIBUTION_URL.is_match(text) {
        return Err(SyncError::PatchTargetNotFound {
            token: "distributionUrl".to_string(),
            artifact: "gradle-wrapper.properties".to_string(),
        });
    }
    let line = distribution_line(version);
    Ok(DISTRIBUTION_URL
        .replace_all(text, regex::NoExpand(&line))
        .into_owned())
}

pub fn pin_artifact(wrapper: &dyn Artifact, version: &str) -> Result<PinOutcome, SyncError> {
    if !wrapper.exists() {
        tracing::debug!("{} not found; nothing to pin", wrapper.name());
        return Ok(PinOutcome::Missing);
    }

    let text = wrapper.read_text()?;
    if text.contains(&format!("gradle-{}-all.zip", version)) {
        return Ok(PinOutcome::AlreadyPinned {
            version: version.to_string(),
        });
    }

    wrapper.write_text(&pin_text(&text, version)?)?;
    tracing::info!("pinned {} to gradle {}", wrapper.name(), version);
    Ok(PinOutcome::Pinned {
        version: version.to_string(),
    })
}

/// Pin the project's wrapper to `version`.
pub fn pin_gradle_wrapper(layout: &ProjectLayout, version: &str) -> Result<PinOutcome, SyncError> {
    pin_artifact(&FileArtifact::new(&layout.gradle_wrapper), version)
}
