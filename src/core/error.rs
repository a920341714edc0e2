//! Synchronization error taxonomy.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Errors raised while reading, editing, or patching project artifacts.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed descriptor: {reason}")]
    MalformedDescriptor {
        reason: String,
        /// Byte offset into the descriptor text, when the parser knows it.
        offset: Option<usize>,
    },

    #[error("`{token}` not found in {artifact}")]
    PatchTargetNotFound { token: String, artifact: String },

    #[error("required artifact `{artifact}` is missing")]
    ArtifactMissing { artifact: String },

    #[error("{step} skipped: {reason}")]
    InjectionSkipped { step: String, reason: String },

    #[error("project descriptor could not be loaded")]
    DescriptorRequired {
        #[source]
        source: Box<SyncError>,
    },

    #[error("`{field}` is not an editable field")]
    UnknownField { field: String },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidEdit { field: String, reason: String },

    #[error("version code `{value}` is not a non-negative integer")]
    InvalidVersionCode { value: String },

    #[error("I/O error on {artifact}")]
    Io {
        artifact: String,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        SyncError::MalformedDescriptor {
            reason: reason.into(),
            offset: None,
        }
    }

    pub(crate) fn io(artifact: impl Into<String>, source: std::io::Error) -> Self {
        SyncError::Io {
            artifact: artifact.into(),
            source,
        }
    }

    /// Wrap a descriptor failure so it surfaces as a hard load error.
    pub(crate) fn descriptor_required(cause: SyncError) -> Self {
        match cause {
            already @ SyncError::DescriptorRequired { .. } => already,
            other => SyncError::DescriptorRequired {
                source: Box::new(other),
            },
        }
    }

    /// Innermost error, skipping `DescriptorRequired` wrappers.
    pub fn root_cause(&self) -> &SyncError {
        match self {
            SyncError::DescriptorRequired { source } => source.root_cause(),
            other => other,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SyncError::MalformedDescriptor { reason, offset } => {
                let mut diag = Diagnostic::error("config.xml could not be parsed")
                    .with_context(reason.clone());
                if let Some(offset) = offset {
                    diag = diag.with_context(format!("at byte offset {}", offset));
                }
                diag.with_suggestion("Make sure config.xml has a single <widget> root element")
            }

            SyncError::PatchTargetNotFound { token, artifact } => {
                Diagnostic::warning(format!("`{}` not found in {}", token, artifact))
                    .with_context("the file was left untouched")
                    .with_suggestion(suggestions::REGENERATE_PLATFORM)
            }

            SyncError::ArtifactMissing { artifact } => {
                Diagnostic::error(format!("`{}` is missing", artifact))
                    .with_location(artifact.clone())
                    .with_suggestion(suggestions::NO_DESCRIPTOR)
            }

            SyncError::InjectionSkipped { step, reason } => {
                Diagnostic::warning(format!("{} skipped", step)).with_context(reason.clone())
            }

            SyncError::DescriptorRequired { source } => {
                let inner = source.to_diagnostic();
                let mut diag = Diagnostic::error("project descriptor could not be loaded")
                    .with_context(inner.message.clone());
                for ctx in inner.context {
                    diag = diag.with_context(ctx);
                }
                for sug in inner.suggestions {
                    diag = diag.with_suggestion(sug);
                }
                diag
            }

            SyncError::UnknownField { field } => {
                Diagnostic::error(format!("`{}` is not an editable field", field))
                    .with_suggestion(suggestions::EDITABLE_FIELDS)
            }

            SyncError::InvalidEdit { field, reason } => {
                Diagnostic::error(format!("invalid value for `{}`", field)).with_context(reason.clone())
            }

            SyncError::InvalidVersionCode { value } => {
                Diagnostic::error(format!("version code `{}` is not an integer", value))
                    .with_suggestion("Use a plain integer such as `--version-code 8`")
            }

            SyncError::Io { artifact, source } => {
                Diagnostic::error(format!("I/O error on {}", artifact))
                    .with_context(source.to_string())
                    .with_location(artifact.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_required_does_not_double_wrap() {
        let err = SyncError::descriptor_required(SyncError::malformed("no root"));
        let err = SyncError::descriptor_required(err);

        match &err {
            SyncError::DescriptorRequired { source } => {
                assert!(matches!(**source, SyncError::MalformedDescriptor { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            err.root_cause(),
            SyncError::MalformedDescriptor { .. }
        ));
    }

    #[test]
    fn test_diagnostic_carries_cause() {
        let err = SyncError::descriptor_required(SyncError::malformed("missing <widget>"));
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: project descriptor could not be loaded"));
        assert!(output.contains("missing <widget>"));
        assert!(output.contains("help: consider:"));
    }
}
