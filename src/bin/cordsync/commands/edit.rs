//! `cordsync edit` command

use anyhow::{Context, Result};

use crate::cli::EditArgs;
use crate::GlobalOptions;
use cordsync::core::{descriptor, SyncError};
use cordsync::ops::config_store::{ConfigEdit, ConfigStore, EditableField};
use cordsync::util::shell::Status;

pub fn execute(args: EditArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let edit = build_edit(&args)?;
    if edit.is_empty() {
        shell.warn("nothing to edit; pass a field flag such as `--version-code 8` or `--set KEY=VALUE`");
        return Ok(());
    }

    let (layout, _) = opts.ctx.layout()?;
    let store = ConfigStore::open(&layout);

    if args.dry_run {
        let view = store.load()?;
        let updated = edit.apply_to(&view.descriptor)?;
        let text = descriptor::generate(&updated);
        if shell.is_json() {
            shell.json_event(&serde_json::json!({
                "reason": "edit",
                "dryRun": true,
                "descriptor": updated,
                "text": text,
            }));
        } else {
            shell.print(text.trim_end());
            shell.note("dry run; nothing was written");
        }
        return Ok(());
    }

    let outcome = store.apply_edit(&edit).context("nothing saved")?;

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "edit",
            "dryRun": false,
            "descriptor": outcome.descriptor(),
            "message": outcome.message(),
            "warning": outcome.warning().map(|w| w.to_string()),
        }));
        return Ok(());
    }

    match outcome.warning() {
        None => shell.status(Status::Saved, outcome.message()),
        Some(warning) => {
            shell.status(Status::Saved, layout.descriptor.display());
            shell.diagnostic(&warning.to_diagnostic().with_context(outcome.message()));
        }
    }
    Ok(())
}

/// Collect `--set` assignments first, then explicit field flags on top.
fn build_edit(args: &EditArgs) -> Result<ConfigEdit, SyncError> {
    let mut edit = ConfigEdit::new();
    for assignment in &args.set {
        let (field, value) = ConfigEdit::parse_assignment(assignment)?;
        edit.insert(field, value);
    }

    let flags = [
        (EditableField::Id, &args.id),
        (EditableField::VersionName, &args.version_name),
        (EditableField::VersionCode, &args.version_code),
        (EditableField::DisplayName, &args.display_name),
        (EditableField::Description, &args.description),
        (EditableField::Author, &args.author),
        (EditableField::EntryContent, &args.entry_content),
        (EditableField::Orientation, &args.orientation),
    ];
    for (field, value) in flags {
        if let Some(value) = value {
            edit.insert(field, value.clone());
        }
    }
    Ok(edit)
}
