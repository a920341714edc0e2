//! `cordsync scan` command

use anyhow::Result;

use crate::GlobalOptions;
use cordsync::core::project::{ScanEntry, ScanReport};
use cordsync::util::fs::relative_to;
use cordsync::util::shell::Status;

pub fn execute(opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let (layout, _) = opts.ctx.layout()?;
    shell.status(Status::Scanning, layout.root().display());

    let report = layout.scan();
    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "scan",
            "root": layout.root().display().to_string(),
            "artifacts": report.entries,
        }));
    } else {
        for line in render(&report, layout.root()) {
            shell.print(line);
        }
    }

    report.ensure_required()?;
    Ok(())
}

fn state(entry: &ScanEntry) -> &'static str {
    match (entry.found, entry.required) {
        (true, _) => "found",
        (false, true) => "missing",
        (false, false) => "absent",
    }
}

fn render(report: &ScanReport, root: &std::path::Path) -> Vec<String> {
    report
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{:<26} {:<8} {}",
                entry.kind.label(),
                state(entry),
                relative_to(root, &entry.path).display()
            )
        })
        .collect()
}
