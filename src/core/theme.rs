//! Starting theme injection for `res/values/themes.xml`.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::SyncError;

/// Style name whose presence marks the file as already patched.
pub const STARTING_THEME: &str = "Theme.App.Starting";

/// Reference used by the main activity.
pub const STARTING_THEME_REF: &str = "@style/Theme.App.Starting";

pub const STARTING_THEME_PARENT: &str = "Theme.AppCompat.NoActionBar";

/// Drawable the theme uses as window background.
pub const SPLASH_DRAWABLE: &str = "@drawable/splash";

static CLOSING_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</resources>\s*$").expect("valid resources pattern"));

/// The style block, indented for a direct child of `<resources>`.
pub fn style_block() -> String {
    format!(
        "    <style name=\"{}\" parent=\"{}\">\n        <item name=\"android:windowBackground\">{}</item>\n    </style>\n",
        STARTING_THEME, STARTING_THEME_PARENT, SPLASH_DRAWABLE
    )
}

/// A complete themes file holding only the starting theme.
pub fn theme_template() -> String {
    format!(
        "<?xml version='1.0' encoding='utf-8'?>\n<resources>\n{}</resources>\n",
        style_block()
    )
}

/// Whether the themes text already declares the starting theme.
pub fn has_starting_theme(text: &str) -> bool {
    text.contains(STARTING_THEME)
}

/// Insert the starting theme before the closing `</resources>`.
///
/// Text that already mentions the marker is returned unchanged.
pub fn inject_starting_theme(text: &str) -> Result<String, SyncError> {
    if has_starting_theme(text) {
        return Ok(text.to_string());
    }

    let closing = CLOSING_ROOT
        .find(text)
        .ok_or_else(|| SyncError::InjectionSkipped {
            step: "theme injection".to_string(),
            reason: "no closing </resources> element".to_string(),
        })?;

    let mut out = String::with_capacity(text.len() + 256);
    out.push_str(&text[..closing.start()]);
    out.push_str(&style_block());
    out.push_str("</resources>\n");
    Ok(out)
}
