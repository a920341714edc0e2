//! Text patches for the generated `AndroidManifest.xml`.
//!
//! The manifest is regenerated by the platform tooling on every prepare, so
//! these operations rewrite only the exact attribute they target and leave
//! every other byte alone. Each operation is idempotent.

use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex::Regex;

use crate::core::error::SyncError;
use crate::core::theme::STARTING_THEME_REF;

/// Activity whose theme is bound to the starting theme.
pub const MAIN_ACTIVITY: &str = "MainActivity";

pub const VERSION_NAME_ATTR: &str = "android:versionName";
pub const VERSION_CODE_ATTR: &str = "android:versionCode";

static MAIN_ACTIVITY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<activity\b[^>]*?\bandroid:name="MainActivity"[^>]*?(\s*/?>)"#)
        .expect("valid activity pattern")
});

static THEME_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bandroid:theme="[^"]*""#).expect("valid theme pattern"));

/// `<manifest>` itself, not a `<manifest-...>` lookalike.
static ROOT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<manifest(?:\s[^>]*)?>").expect("valid manifest pattern")
});

static VERSION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bandroid:versionName="[^"]*""#).expect("valid versionName pattern")
});

static VERSION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bandroid:versionCode="[^"]*""#).expect("valid versionCode pattern")
});

/// Attribute an ads plugin sometimes writes onto `<manifest>` instead of a
/// `<uses-permission>` element.
static MISINJECTED_AD_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sandroid:name="com\.google\.android\.gms\.permission\.AD_ID""#)
        .expect("valid AD_ID pattern")
});

static USES_PERMISSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<uses-permission\b[^>]*?\bandroid:name="([^"]+)""#)
        .expect("valid uses-permission pattern")
});

static EXTRACT_NATIVE_LIBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<application\b[^>]*?\bandroid:extractNativeLibs="([^"]*)""#)
        .expect("valid extractNativeLibs pattern")
});

/// Point the main activity at the starting theme.
///
/// An existing `android:theme` value is replaced; otherwise the attribute is
/// appended to the tag. Fails with `InjectionSkipped` when the activity is
/// not declared.
pub fn bind_activity_theme(text: &str) -> Result<String, SyncError> {
    let caps = MAIN_ACTIVITY_TAG
        .captures(text)
        .ok_or_else(|| SyncError::InjectionSkipped {
            step: "activity theme binding".to_string(),
            reason: format!("no <activity android:name=\"{}\"> declaration", MAIN_ACTIVITY),
        })?;
    let (Some(whole), Some(close)) = (caps.get(0), caps.get(1)) else {
        return Ok(text.to_string());
    };

    let head = &text[whole.start()..close.start()];
    let theme = format!("android:theme=\"{}\"", STARTING_THEME_REF);
    let new_head = match THEME_ATTR.find(head) {
        Some(existing) => format!("{}{}{}", &head[..existing.start()], theme, &head[existing.end()..]),
        None => format!("{} {}", head, theme),
    };

    let mut out = String::with_capacity(text.len() + theme.len() + 1);
    out.push_str(&text[..whole.start()]);
    out.push_str(&new_head);
    out.push_str(&text[close.start()..]);
    Ok(out)
}

/// Sync version attributes onto the root `<manifest>` tag.
///
/// Present values replace the existing attribute or are inserted right after
/// the tag name. The misinjected `AD_ID` attribute is always stripped from
/// the root tag.
pub fn sync_root_versions(
    text: &str,
    version_name: Option<&str>,
    version_code: Option<&str>,
) -> Result<String, SyncError> {
    let root = ROOT_TAG
        .find(text)
        .ok_or_else(|| SyncError::InjectionSkipped {
            step: "version sync".to_string(),
            reason: "no <manifest> root element".to_string(),
        })?;

    let mut tag = strip_misinjected_attribute(root.as_str());
    if let Some(name) = version_name.filter(|v| !v.is_empty()) {
        tag = set_root_attribute(&tag, &VERSION_NAME, VERSION_NAME_ATTR, name);
    }
    if let Some(code) = version_code.filter(|v| !v.is_empty()) {
        tag = set_root_attribute(&tag, &VERSION_CODE, VERSION_CODE_ATTR, code);
    }

    let mut out = String::with_capacity(text.len() + 64);
    out.push_str(&text[..root.start()]);
    out.push_str(&tag);
    out.push_str(&text[root.end()..]);
    Ok(out)
}

/// Remove the `AD_ID` permission name from a root tag.
pub fn strip_misinjected_attribute(root_tag: &str) -> String {
    MISINJECTED_AD_ID.replace_all(root_tag, "").into_owned()
}

fn set_root_attribute(tag: &str, pattern: &Regex, attr: &str, value: &str) -> String {
    let attribute = format!("{}=\"{}\"", attr, escape(value));
    match pattern.find(tag) {
        Some(existing) => format!("{}{}{}", &tag[..existing.start()], attribute, &tag[existing.end()..]),
        None => {
            let name_end = "<manifest".len();
            format!("{} {}{}", &tag[..name_end], attribute, &tag[name_end..])
        }
    }
}

/// Permission names declared with `<uses-permission>`.
pub fn declared_permissions(text: &str) -> Vec<String> {
    USES_PERMISSION
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Value of `android:extractNativeLibs` on `<application>`, if declared.
pub fn extract_native_libs(text: &str) -> Option<String> {
    EXTRACT_NATIVE_LIBS
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
