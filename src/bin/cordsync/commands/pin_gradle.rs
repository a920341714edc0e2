//! `cordsync pin-gradle` command

use anyhow::Result;

use crate::cli::PinGradleArgs;
use crate::GlobalOptions;
use cordsync::ops::gradle_wrapper::{pin_gradle_wrapper, PinOutcome};
use cordsync::util::diagnostic::suggestions;
use cordsync::util::shell::Status;

pub fn execute(args: PinGradleArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let (layout, config) = opts.ctx.layout()?;
    let version = args
        .version
        .unwrap_or_else(|| config.wrapper.gradle_version().to_string());

    let outcome = pin_gradle_wrapper(&layout, &version)?;
    if shell.is_json() {
        let state = match &outcome {
            PinOutcome::Pinned { .. } => "pinned",
            PinOutcome::AlreadyPinned { .. } => "unchanged",
            PinOutcome::Missing => "missing",
        };
        shell.json_event(&serde_json::json!({
            "reason": "pin-gradle",
            "state": state,
            "version": version,
        }));
        return Ok(());
    }

    match outcome {
        PinOutcome::Pinned { version } => {
            shell.status(Status::Pinned, format!("gradle wrapper to {}", version))
        }
        PinOutcome::AlreadyPinned { version } => {
            shell.status(Status::Unchanged, format!("gradle wrapper already on {}", version))
        }
        PinOutcome::Missing => shell.status(
            Status::Skipped,
            format!(
                "{} not found. {}",
                layout.gradle_wrapper.display(),
                suggestions::NO_PLATFORM
            ),
        ),
    }
    Ok(())
}
