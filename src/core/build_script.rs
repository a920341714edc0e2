//! `build.gradle` fact extraction and version code patching.
//!
//! The build script is generated by the platform tooling, so it is treated
//! as opaque text: facts are pulled out by pattern search, and the only
//! rewrite touches the digits of the first `versionCode` token.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::SyncError;

static VERSION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"versionCode\s+(\d+)").expect("valid versionCode pattern"));

static APPLICATION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"applicationId\s+["']([^"']+)["']"#).expect("valid applicationId pattern")
});

static MIN_SDK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"minSdkVersion\s+(\d+)").expect("valid minSdk pattern"));

static TARGET_SDK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"targetSdkVersion\s+(\d+)").expect("valid targetSdk pattern"));

static COMPILE_SDK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"compileSdkVersion\s+(\d+)").expect("valid compileSdk pattern")
});

static KEY_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"keyAlias\s+["']([^"']+)["']"#).expect("valid keyAlias pattern")
});

/// Best-effort facts found in a build script. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildScriptFacts {
    pub version_code: Option<String>,
    pub application_id: Option<String>,
    pub min_sdk_version: Option<String>,
    pub target_sdk_version: Option<String>,
    pub compile_sdk_version: Option<String>,
    /// Signing key alias
    pub key_alias: Option<String>,
}

impl BuildScriptFacts {
    /// True when nothing was found.
    pub fn is_empty(&self) -> bool {
        *self == BuildScriptFacts::default()
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract facts from build script text. Never fails.
pub fn extract(text: &str) -> BuildScriptFacts {
    BuildScriptFacts {
        version_code: first_capture(&VERSION_CODE, text),
        application_id: first_capture(&APPLICATION_ID, text),
        min_sdk_version: first_capture(&MIN_SDK, text),
        target_sdk_version: first_capture(&TARGET_SDK, text),
        compile_sdk_version: first_capture(&COMPILE_SDK, text),
        key_alias: first_capture(&KEY_ALIAS, text),
    }
}

/// Replace the digits of the first `versionCode <int>` token.
///
/// Everything else in `text` is returned unchanged. Fails with
/// `PatchTargetNotFound` rather than appending a new token.
pub fn patch_version_code(text: &str, new_value: &str) -> Result<String, SyncError> {
    if new_value.is_empty() || !new_value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SyncError::InvalidVersionCode {
            value: new_value.to_string(),
        });
    }

    let digits = VERSION_CODE
        .captures(text)
        .and_then(|cap| cap.get(1))
        .ok_or_else(|| SyncError::PatchTargetNotFound {
            token: "versionCode".to_string(),
            artifact: "build.gradle".to_string(),
        })?;

    let mut patched = String::with_capacity(text.len() + new_value.len());
    patched.push_str(&text[..digits.start()]);
    patched.push_str(new_value);
    patched.push_str(&text[digits.end()..]);
    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures;

    #[test]
    fn test_extract_all_facts() {
        let facts = extract(fixtures::BUILD_GRADLE);
        assert_eq!(facts.version_code.as_deref(), Some("7"));
        assert_eq!(facts.application_id.as_deref(), Some("com.app.demo"));
        assert_eq!(facts.min_sdk_version.as_deref(), Some("21"));
        assert_eq!(facts.target_sdk_version.as_deref(), Some("35"));
        assert_eq!(facts.compile_sdk_version.as_deref(), Some("35"));
        assert_eq!(facts.key_alias.as_deref(), Some("release"));
    }

    #[test]
    fn test_extract_is_independent_per_field() {
        let facts = extract("android {\n    applicationId 'com.single.quote'\n}\n");
        assert_eq!(facts.version_code, None);
        assert_eq!(facts.application_id.as_deref(), Some("com.single.quote"));
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract("// empty build script\n").is_empty());
    }

    #[test]
    fn test_extract_uses_first_occurrence() {
        let facts = extract("versionCode 3\nversionCode 4\n");
        assert_eq!(facts.version_code.as_deref(), Some("3"));
    }

    #[test]
    fn test_patch_exact_before_after() {
        let before = "defaultConfig {\n    versionCode   7 // bump me\n    versionName \"1.2.0\"\n}\n";
        let after = "defaultConfig {\n    versionCode   8 // bump me\n    versionName \"1.2.0\"\n}\n";
        assert_eq!(patch_version_code(before, "8").unwrap(), after);
    }

    #[test]
    fn test_patch_only_touches_first_occurrence() {
        let patched = patch_version_code("versionCode 1\nversionCode 1\n", "20").unwrap();
        assert_eq!(patched, "versionCode 20\nversionCode 1\n");
    }

    #[test]
    fn test_patch_preserves_everything_else() {
        let before = fixtures::BUILD_GRADLE;
        let after = patch_version_code(before, "1234").unwrap();

        let mask = |s: &str| VERSION_CODE.replace(s, "versionCode N").into_owned();
        assert_eq!(mask(before), mask(&after));
        assert_eq!(extract(&after).version_code.as_deref(), Some("1234"));
    }

    #[test]
    fn test_patch_without_target_fails() {
        let err = patch_version_code("android {}\n", "8").unwrap_err();
        assert!(matches!(err, SyncError::PatchTargetNotFound { .. }));
    }

    #[test]
    fn test_patch_rejects_non_numeric_value() {
        for bad in ["", "8a", "-1", "1 2"] {
            assert!(matches!(
                patch_version_code("versionCode 7", bad),
                Err(SyncError::InvalidVersionCode { .. })
            ));
        }
    }
}
