//! `cordsync show` command

use anyhow::{Context, Result};

use crate::GlobalOptions;
use cordsync::ops::config_store::{ConfigStore, MergedConfigView};
use cordsync::util::shell::Status;

pub fn execute(opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let (layout, _) = opts.ctx.layout()?;

    let store = ConfigStore::open(&layout);
    let view = store.load()?;
    shell.status(Status::Loaded, layout.descriptor.display());
    if !store.has_build_script() {
        shell.note("build.gradle not found; showing config.xml values only");
    }

    if shell.is_json() {
        let config = serde_json::to_value(&view).context("failed to serialize configuration")?;
        shell.json_event(&serde_json::json!({
            "reason": "config",
            "config": config,
        }));
    } else {
        for line in render(&view) {
            shell.print(line);
        }
    }
    Ok(())
}

fn row(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<18}{}", label, value)
}

fn render(view: &MergedConfigView) -> Vec<String> {
    let d = &view.descriptor;
    let mut lines = vec![
        row("Package name", &view.package_name),
        row("Version name", &view.version_name),
        row("Version code", &view.version_code),
        row("Display name", &d.display_name),
        row("Description", &d.description),
        row("Author", &d.author),
        row("Entry content", &d.entry_content),
        row("Orientation", d.orientation),
    ];

    if let Some(facts) = view.build_script.as_ref().filter(|f| !f.is_empty()) {
        lines.push(String::new());
        lines.push("Build script".to_string());
        let sdk = [
            ("  minSdkVersion", &facts.min_sdk_version),
            ("  targetSdkVersion", &facts.target_sdk_version),
            ("  compileSdkVersion", &facts.compile_sdk_version),
        ];
        for (label, value) in sdk {
            if let Some(value) = value {
                lines.push(row(label, value));
            }
        }
    }

    let extras = &view.extras;
    lines.push(String::new());
    lines.push("Permissions".to_string());
    lines.extend(extras.permissions.iter().map(|p| format!("  {}", p)));

    lines.push(String::new());
    lines.push("Signing".to_string());
    let keystore_state = if extras.signing.keystore_exists {
        "present"
    } else {
        "missing"
    };
    lines.push(row(
        "  keystore",
        format!("{} ({})", extras.signing.keystore_file, keystore_state),
    ));
    lines.push(row(
        "  key alias",
        extras.signing.key_alias.as_deref().unwrap_or("-"),
    ));
    lines.push(row("  passwords", &extras.signing.store_password));

    lines.push(String::new());
    let alignment = &extras.native_alignment;
    lines.push(row(
        "16 KB alignment",
        format!(
            "{} (extractNativeLibs={})",
            if alignment.enabled { "enabled" } else { "disabled" },
            alignment.extract_native_libs
        ),
    ));
    lines.push(row("HW acceleration", extras.hardware_accelerated));

    if !extras.icons.is_empty() {
        lines.push(String::new());
        lines.push("Icons".to_string());
        for (size, src) in &extras.icons {
            lines.push(row(&format!("  {}", size), src));
        }
    }
    lines
}
