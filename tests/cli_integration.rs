//! CLI integration tests for cordsync.
//!
//! These tests run the binary against throwaway Cordova projects and check
//! both the output and the files left on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG_XML: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<widget id="com.app.demo" version="1.2.0" xmlns="http://www.w3.org/ns/widgets">
    <name>Demo App</name>
    <description>A sample application</description>
    <author email="" href="">Apache Cordova Team</author>
    <content src="index.html" />
    <platform name="android">
        <preference name="Orientation" value="landscape" />
    </platform>
</widget>
"#;

const BUILD_GRADLE: &str = r#"android {
    defaultConfig {
        applicationId "com.app.demo"
        minSdkVersion 21
        versionCode 7
        versionName "1.2.0"
    }
}
"#;

const ANDROID_MANIFEST: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<manifest android:versionCode="10200" android:versionName="1.2.0" package="com.app.demo" xmlns:android="http://schemas.android.com/apk/res/android">
    <uses-permission android:name="android.permission.INTERNET" />
    <application android:extractNativeLibs="false">
        <activity android:exported="true" android:name="MainActivity" android:theme="@style/Theme.App.SplashScreen">
        </activity>
    </application>
</manifest>
"#;

const THEMES_XML: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<resources>
    <style name="Theme.App.SplashScreen" parent="Theme.SplashScreen" />
</resources>
"#;

const GRADLE_WRAPPER: &str = "distributionBase=GRADLE_USER_HOME\n\
distributionUrl=https\\://services.gradle.org/distributions/gradle-8.7-all.zip\n";

const APP: &str = "platforms/android/app";
const MAIN: &str = "platforms/android/app/src/main";

/// Get the cordsync binary command, isolated from the caller's environment.
fn cordsync(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cordsync").unwrap();
    cmd.env("HOME", home)
        .env_remove("CORDOVA_PLATFORMS")
        .env_remove("CORDSYNC_PROJECT_ROOT")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

/// A project directory plus a separate fake home.
struct Project {
    tmp: TempDir,
}

impl Project {
    fn descriptor_only() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("home")).unwrap();
        write(&tmp.path().join("app"), "config.xml", CONFIG_XML);
        Project { tmp }
    }

    fn with_android_platform() -> Self {
        let project = Self::descriptor_only();
        let root = project.root();
        write(&root, &format!("{APP}/build.gradle"), BUILD_GRADLE);
        write(&root, &format!("{MAIN}/AndroidManifest.xml"), ANDROID_MANIFEST);
        write(&root, &format!("{MAIN}/res/values/themes.xml"), THEMES_XML);
        write(
            &root,
            "platforms/android/gradle/wrapper/gradle-wrapper.properties",
            GRADLE_WRAPPER,
        );
        write(&root, "www/img/1125x2436.png", b"\x89PNG\r\n\x1a\nsplash");
        project
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("app")
    }

    fn cmd(&self) -> Command {
        let mut cmd = cordsync(&self.tmp.path().join("home"));
        cmd.current_dir(self.root());
        cmd
    }
}

// ============================================================================
// cordsync scan
// ============================================================================

#[test]
fn test_scan_lists_artifacts() {
    let project = Project::descriptor_only();

    project
        .cmd()
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.xml"))
        .stdout(predicate::str::contains("found"))
        .stdout(predicate::str::contains("absent"));
}

#[test]
fn test_scan_outside_project_fails() {
    let tmp = TempDir::new().unwrap();

    cordsync(tmp.path())
        .arg("scan")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.xml"));
}

#[test]
fn test_scan_from_nested_directory() {
    let project = Project::descriptor_only();
    let nested = project.root().join("www").join("js");
    fs::create_dir_all(&nested).unwrap();

    project
        .cmd()
        .arg("scan")
        .current_dir(&nested)
        .assert()
        .success()
        .stdout(predicate::str::contains("found"));
}

// ============================================================================
// cordsync show
// ============================================================================

#[test]
fn test_show_merges_build_script_version_code() {
    let project = Project::with_android_platform();

    project
        .cmd()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Package name      com.app.demo"))
        .stdout(predicate::str::contains("Version code      7"))
        .stdout(predicate::str::contains("Orientation       landscape"));
}

#[test]
fn test_show_without_build_script() {
    let project = Project::descriptor_only();

    project
        .cmd()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version code      unknown"));
}

#[test]
fn test_show_json() {
    let project = Project::with_android_platform();

    let output = project
        .cmd()
        .args(["show", "--message-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let event: serde_json::Value = stdout
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .find(|v| v["reason"] == "config")
        .expect("config event");
    assert_eq!(event["config"]["versionCode"], "7");
    assert_eq!(event["config"]["packageName"], "com.app.demo");
    assert_eq!(event["config"]["descriptor"]["orientation"], "landscape");
}

#[test]
fn test_show_malformed_descriptor_fails() {
    let project = Project::descriptor_only();
    write(&project.root(), "config.xml", "<manifest/>");

    project
        .cmd()
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("widget"));
}

// ============================================================================
// cordsync edit
// ============================================================================

#[test]
fn test_edit_version_code_updates_both_files() {
    let project = Project::with_android_platform();

    project
        .cmd()
        .args(["edit", "--version-code", "8"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved"));

    let config = read(&project.root(), "config.xml");
    assert!(config.contains(r#"android-versionCode="8""#));
    assert!(config.contains(r#"id="com.app.demo""#));
    assert!(config.contains(r#"<preference name="Orientation" value="landscape"/>"#));

    let gradle = read(&project.root(), &format!("{APP}/build.gradle"));
    assert_eq!(gradle, BUILD_GRADLE.replace("versionCode 7", "versionCode 8"));
}

#[test]
fn test_edit_warns_when_build_script_has_no_version_code() {
    let project = Project::with_android_platform();
    write(&project.root(), &format!("{APP}/build.gradle"), "android {}\n");

    project
        .cmd()
        .args(["edit", "--version-code", "8", "--display-name", "Renamed"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning"))
        .stderr(predicate::str::contains("versionCode"));

    let config = read(&project.root(), "config.xml");
    assert!(config.contains("<name>Renamed</name>"));
    assert_eq!(
        read(&project.root(), &format!("{APP}/build.gradle")),
        "android {}\n"
    );
}

#[test]
fn test_edit_unknown_field_fails() {
    let project = Project::descriptor_only();

    project
        .cmd()
        .args(["edit", "--set", "packageName=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an editable field"));

    assert_eq!(read(&project.root(), "config.xml"), CONFIG_XML);
}

#[test]
fn test_edit_dry_run_writes_nothing() {
    let project = Project::descriptor_only();

    project
        .cmd()
        .args(["edit", "--set", "versionCode=9", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"android-versionCode="9""#));

    assert_eq!(read(&project.root(), "config.xml"), CONFIG_XML);
}

#[test]
fn test_edit_without_fields_is_a_noop() {
    let project = Project::descriptor_only();

    project
        .cmd()
        .arg("edit")
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to edit"));
}

// ============================================================================
// cordsync prepare
// ============================================================================

#[test]
fn test_prepare_syncs_platform_files() {
    let project = Project::with_android_platform();
    let root = project.root();

    project.cmd().arg("prepare").assert().success();

    let manifest = read(&root, &format!("{MAIN}/AndroidManifest.xml"));
    assert!(manifest.contains(r#"android:name="MainActivity" android:theme="@style/Theme.App.Starting""#));
    assert!(manifest.contains(r#"android:versionName="1.2.0""#));

    let themes = read(&root, &format!("{MAIN}/res/values/themes.xml"));
    assert!(themes.contains(r#"<style name="Theme.App.Starting" parent="Theme.AppCompat.NoActionBar">"#));
    assert!(themes.contains("Theme.App.SplashScreen"));

    assert_eq!(
        fs::read(root.join(format!("{MAIN}/res/drawable/splash.png"))).unwrap(),
        b"\x89PNG\r\n\x1a\nsplash"
    );

    let wrapper = read(&root, "platforms/android/gradle/wrapper/gradle-wrapper.properties");
    assert!(wrapper.contains("gradle-8.9-all.zip"));
}

#[test]
fn test_prepare_twice_is_idempotent() {
    let project = Project::with_android_platform();
    let root = project.root();
    let files = [
        format!("{MAIN}/AndroidManifest.xml"),
        format!("{MAIN}/res/values/themes.xml"),
        format!("{MAIN}/res/drawable/splash.png"),
        "platforms/android/gradle/wrapper/gradle-wrapper.properties".to_string(),
    ];

    project.cmd().arg("prepare").assert().success();
    let first: Vec<Vec<u8>> = files.iter().map(|f| fs::read(root.join(f)).unwrap()).collect();

    project
        .cmd()
        .args(["prepare", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unchanged"));
    let second: Vec<Vec<u8>> = files.iter().map(|f| fs::read(root.join(f)).unwrap()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_prepare_survives_malformed_descriptor() {
    let project = Project::with_android_platform();
    write(&project.root(), "config.xml", "<widget id=\"a\">");

    project
        .cmd()
        .arg("prepare")
        .assert()
        .success()
        .stderr(predicate::str::contains("version-sync failed"))
        .stderr(predicate::str::contains("partially failed"));

    let manifest = read(&project.root(), &format!("{MAIN}/AndroidManifest.xml"));
    assert!(manifest.contains("@style/Theme.App.Starting"));
}

#[test]
fn test_prepare_other_platform_is_skipped() {
    let project = Project::with_android_platform();

    project
        .cmd()
        .args(["prepare", "--platform", "ios"])
        .assert()
        .success();

    assert_eq!(
        read(&project.root(), &format!("{MAIN}/AndroidManifest.xml")),
        ANDROID_MANIFEST
    );
}

#[test]
fn test_prepare_respects_cordova_platforms_env() {
    let project = Project::with_android_platform();

    project
        .cmd()
        .env("CORDOVA_PLATFORMS", "browser,ios")
        .arg("prepare")
        .assert()
        .success();

    assert_eq!(
        read(&project.root(), &format!("{MAIN}/res/values/themes.xml")),
        THEMES_XML
    );
}

#[test]
fn test_prepare_no_pin_gradle() {
    let project = Project::with_android_platform();

    project
        .cmd()
        .args(["prepare", "--no-pin-gradle"])
        .assert()
        .success();

    assert_eq!(
        read(
            &project.root(),
            "platforms/android/gradle/wrapper/gradle-wrapper.properties"
        ),
        GRADLE_WRAPPER
    );
}

// ============================================================================
// cordsync pin-gradle / completions
// ============================================================================

#[test]
fn test_pin_gradle_with_explicit_version() {
    let project = Project::with_android_platform();

    project
        .cmd()
        .args(["pin-gradle", "--version", "8.10.2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Pinned"));

    let wrapper = read(
        &project.root(),
        "platforms/android/gradle/wrapper/gradle-wrapper.properties",
    );
    assert!(wrapper.contains(
        "distributionUrl=https\\://services.gradle.org/distributions/gradle-8.10.2-all.zip"
    ));
}

#[test]
fn test_pin_gradle_uses_project_config() {
    let project = Project::with_android_platform();
    write(
        &project.root(),
        ".cordsync/config.toml",
        "[wrapper]\ngradle_version = \"8.11\"\n",
    );

    project.cmd().arg("pin-gradle").assert().success();

    let wrapper = read(
        &project.root(),
        "platforms/android/gradle/wrapper/gradle-wrapper.properties",
    );
    assert!(wrapper.contains("gradle-8.11-all.zip"));
}

#[test]
fn test_project_root_flag() {
    let project = Project::descriptor_only();

    cordsync(&project.tmp.path().join("home"))
        .current_dir(project.tmp.path())
        .args(["-C", "app", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.app.demo"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    cordsync(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cordsync"));
}
