//! Terminal output for the CLI.
//!
//! Status lines and diagnostics go to stderr, right-aligned the way cargo
//! prints them. Command data (scan rows, the merged view, dry-run text) goes
//! to stdout. With `--message-format json` both are replaced by one JSON
//! object per line on stdout.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use crate::util::diagnostic::{Diagnostic, Severity};

/// Width of the right-aligned status column.
const STATUS_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `--quiet`: errors only
    Quiet,
    #[default]
    Normal,
    /// `--verbose`: unchanged and disabled steps too
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// When to colour status words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!(
                "unknown color mode `{}` (use auto, always or never)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Done,
    Progress,
    Quiet,
    Caution,
    Failure,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Done => "\x1b[1;32m",
            Tone::Progress => "\x1b[1;36m",
            Tone::Quiet => "\x1b[1;34m",
            Tone::Caution => "\x1b[1;33m",
            Tone::Failure => "\x1b[1;31m",
        }
    }
}

/// The word printed in the status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Saved,
    Updated,
    Created,
    Copied,
    Pinned,
    Finished,
    Loaded,
    Scanning,
    Syncing,
    Info,
    Unchanged,
    Skipped,
    Warning,
    Error,
}

impl Status {
    fn word(self) -> &'static str {
        match self {
            Status::Saved => "Saved",
            Status::Updated => "Updated",
            Status::Created => "Created",
            Status::Copied => "Copied",
            Status::Pinned => "Pinned",
            Status::Finished => "Finished",
            Status::Loaded => "Loaded",
            Status::Scanning => "Scanning",
            Status::Syncing => "Syncing",
            Status::Info => "Info",
            Status::Unchanged => "Unchanged",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Status::Saved
            | Status::Updated
            | Status::Created
            | Status::Copied
            | Status::Pinned
            | Status::Finished => Tone::Done,
            Status::Loaded | Status::Scanning | Status::Syncing => Tone::Progress,
            Status::Info | Status::Unchanged => Tone::Quiet,
            Status::Skipped | Status::Warning => Tone::Caution,
            Status::Error => Tone::Failure,
        }
    }
}

/// Output sink shared by every command.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    format: OutputFormat,
    color: bool,
    /// JSON lines written so far
    emitted: Mutex<Vec<String>>,
}

impl Shell {
    pub fn new(verbosity: Verbosity, format: OutputFormat, color: ColorChoice) -> Self {
        Shell {
            verbosity,
            format,
            color: format == OutputFormat::Human && color.enabled(),
            emitted: Mutex::new(Vec::new()),
        }
    }

    /// Build a shell from the global CLI flags. `--quiet` wins over
    /// `--verbose`; JSON output ignores both.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };
        Shell::new(verbosity, format, color)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_quiet(&self) -> bool {
        !self.is_json() && self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        !self.is_json() && self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.color
    }

    /// Print `{status:>12} {msg}` to stderr. Human mode only; quiet mode
    /// keeps errors.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || (self.is_quiet() && status != Status::Error) {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn verbose_status(&self, status: Status, msg: impl Display) {
        if self.is_verbose() {
            self.status(status, msg);
        }
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// A warning line, or a `warning` event in JSON mode.
    pub fn warn(&self, msg: impl Display) {
        self.message(Status::Warning, "warning", msg);
    }

    /// An error line, or an `error` event in JSON mode.
    pub fn error(&self, msg: impl Display) {
        self.message(Status::Error, "error", msg);
    }

    fn message(&self, status: Status, reason: &str, msg: impl Display) {
        if self.is_json() {
            self.json_event(&json!({ "reason": reason, "message": msg.to_string() }));
        } else {
            self.status(status, msg);
        }
    }

    /// Print a full diagnostic. In JSON mode the event's `reason` is the
    /// severity.
    pub fn diagnostic(&self, diag: &Diagnostic) {
        if self.is_json() {
            let mut event = serde_json::to_value(diag).unwrap_or(Value::Null);
            if let Value::Object(map) = &mut event {
                map.insert("reason".to_string(), json!(diag.severity.to_string()));
            }
            self.json_event(&event);
        } else if !self.is_quiet() || diag.severity == Severity::Error {
            eprint!("{}", diag.format(self.color));
        }
    }

    /// Print command data to stdout. Ignored in JSON mode.
    pub fn print(&self, line: impl Display) {
        if !self.is_json() {
            println!("{}", line);
        }
    }

    /// Write one JSON line to stdout. Ignored in human mode.
    pub fn json_event(&self, event: &Value) {
        if !self.is_json() {
            return;
        }
        let line = event.to_string();
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();

        if let Ok(mut emitted) = self.emitted.lock() {
            emitted.push(line);
        }
    }

    /// JSON lines written so far.
    pub fn json_events(&self) -> Vec<String> {
        self.emitted
            .lock()
            .map(|emitted| emitted.clone())
            .unwrap_or_default()
    }

    fn format_status(&self, status: Status) -> String {
        let padded = format!("{:>width$}", status.word(), width = STATUS_WIDTH);
        if self.color {
            format!("{}{}\x1b[0m", status.tone().ansi(), padded)
        } else {
            padded
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, OutputFormat::Human, ColorChoice::Auto)
    }
}

/// `0.42s` under a minute, `1.5m` above.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
