//! `cordsync prepare` command
//!
//! Meant to be wired into the Cordova `after_prepare` hook. Step failures
//! are reported as warnings; the command still exits successfully.

use std::time::Instant;

use anyhow::Result;

use crate::cli::PrepareArgs;
use crate::GlobalOptions;
use cordsync::core::project::ProjectLayout;
use cordsync::ops::gradle_wrapper::{pin_gradle_wrapper, PinOutcome};
use cordsync::ops::manifest_sync::{
    HookState, ManifestSyncHook, StepStatus, SyncReport, SyncStep,
};
use cordsync::util::diagnostic::suggestions;
use cordsync::util::shell::{format_duration, Shell, Status};

pub fn execute(args: PrepareArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    if !targets_android(&args.platforms) {
        shell.status(
            Status::Skipped,
            format!("android is not being prepared ({})", args.platforms.join(", ")),
        );
        return Ok(());
    }

    let start = Instant::now();
    let (layout, config) = opts.ctx.layout()?;
    shell.status(Status::Syncing, layout.root().display());

    let report = ManifestSyncHook::new(&layout).run();
    print_report(shell, &report);
    if report.state() == HookState::PartiallyFailed {
        shell.note(suggestions::RERUN_PREPARE);
    }

    if args.no_pin_gradle || !config.wrapper.pin_on_prepare() {
        shell.verbose_status(Status::Skipped, "gradle wrapper pin disabled");
    } else {
        pin_wrapper(shell, &layout, config.wrapper.gradle_version());
    }

    shell.status(
        Status::Finished,
        format!(
            "prepare {} in {}",
            report.state(),
            format_duration(start.elapsed())
        ),
    );
    Ok(())
}

/// An empty platform list means the hook was invoked directly.
fn targets_android(platforms: &[String]) -> bool {
    platforms.is_empty()
        || platforms
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case("android"))
}

fn print_report(shell: &Shell, report: &SyncReport) {
    if shell.is_json() {
        shell.json_event(&report.to_json());
        return;
    }

    for outcome in &report.steps {
        let step = outcome.step;
        match &outcome.status {
            StepStatus::Applied(detail) => {
                shell.status(applied_status(step, detail), format!("{}: {}", step, detail))
            }
            StepStatus::Unchanged => shell.verbose_status(Status::Unchanged, step),
            StepStatus::Skipped(reason) => {
                shell.status(Status::Skipped, format!("{}: {}", step, reason))
            }
            StepStatus::Failed(err) => shell.warn(format!("{} failed: {}", step, err)),
        }
    }
}

fn applied_status(step: SyncStep, detail: &str) -> Status {
    match step {
        SyncStep::SplashCopy => Status::Copied,
        _ if detail.starts_with("created ") => Status::Created,
        _ => Status::Updated,
    }
}

fn pin_wrapper(shell: &Shell, layout: &ProjectLayout, version: &str) {
    match pin_gradle_wrapper(layout, version) {
        Ok(PinOutcome::Pinned { version }) => {
            shell.status(Status::Pinned, format!("gradle wrapper to {}", version))
        }
        Ok(PinOutcome::AlreadyPinned { version }) => {
            shell.verbose_status(Status::Unchanged, format!("gradle wrapper already on {}", version))
        }
        Ok(PinOutcome::Missing) => {
            shell.verbose_status(Status::Skipped, "gradle-wrapper.properties not found")
        }
        Err(e) => shell.warn(format!("gradle wrapper not pinned: {}", e)),
    }
}
