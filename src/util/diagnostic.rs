//! User-friendly diagnostic messages.
//!
//! Every error shown to the user carries its root cause and, where one
//! exists, a concrete next step.

use std::fmt;
use std::path::{Path, PathBuf};

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use serde::Serialize;
use thiserror::Error;

/// Next steps shared between error kinds.
pub mod suggestions {
    /// No `config.xml` above the working directory.
    pub const NO_DESCRIPTOR: &str =
        "Run cordsync from a Cordova project root or pass `--project-root <DIR>`";

    /// A generated platform file lacks an expected token.
    pub const REGENERATE_PLATFORM: &str =
        "Re-create the platform with `cordova platform add android` and retry";

    pub const EDITABLE_FIELDS: &str = "Editable fields: id, versionName, versionCode, \
         displayName, description, author, entryContent, orientation";

    /// The android platform has not been generated yet.
    pub const NO_PLATFORM: &str = "Run `cordova prepare android` to generate the platform files";

    pub const RERUN_PREPARE: &str = "Fix the file and run `cordsync prepare` again";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An actionable message: what went wrong, where, and what to try next.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Extra lines rendered as `= ...`
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    /// File the diagnostic is about
    pub location: Option<PathBuf>,
}

fn paint(color: bool, ansi: &str, text: &str) -> String {
    if color {
        format!("{}{}\x1b[0m", ansi, text)
    } else {
        text.to_string()
    }
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for the terminal.
    ///
    /// ```text
    /// warning: `versionCode` not found in build.gradle
    ///   --> platforms/android/app/build.gradle
    ///   = the file was left untouched
    ///
    /// help: consider:
    ///   1. Re-create the platform ...
    /// ```
    pub fn format(&self, color: bool) -> String {
        let mut lines = vec![format!(
            "{}: {}",
            paint(color, self.severity.ansi(), self.severity.label()),
            self.message
        )];
        if let Some(path) = &self.location {
            lines.push(format!("  --> {}", path.display()));
        }
        lines.extend(self.context.iter().map(|ctx| format!("  = {}", ctx)));

        if !self.suggestions.is_empty() {
            lines.push(String::new());
            lines.push(format!("{}: consider:", paint(color, "\x1b[1;32m", "help")));
            lines.extend(
                self.suggestions
                    .iter()
                    .enumerate()
                    .map(|(i, s)| format!("  {}. {}", i + 1, s)),
            );
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Descriptor parse failure pointing into the source text.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("malformed descriptor: {reason}")]
#[diagnostic(
    code(cordsync::descriptor::malformed),
    help("config.xml must contain a single well-formed <widget> element")
)]
pub struct MalformedDescriptorReport {
    pub reason: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("parsing stopped here")]
    pub span: SourceSpan,
}

impl MalformedDescriptorReport {
    /// Build a report labelling `offset` within `text`.
    pub fn new(path: &Path, text: String, reason: impl Into<String>, offset: usize) -> Self {
        let len = text.len();
        let start = offset.min(len.saturating_sub(1));
        let width = usize::from(start < len);

        MalformedDescriptorReport {
            reason: reason.into(),
            src: NamedSource::new(path.display().to_string(), text),
            span: SourceSpan::from((start, width)),
        }
    }
}

/// Render a source-annotated report for a malformed descriptor on disk.
///
/// Returns `None` when the file cannot be re-read.
pub fn render_malformed_descriptor(path: &Path, reason: &str, offset: usize) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let report = miette::Report::new(MalformedDescriptorReport::new(path, text, reason, offset));
    Some(format!("{:?}", report))
}
