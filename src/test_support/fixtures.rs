//! Test fixtures for common test scenarios.
//!
//! Artifact texts as a freshly generated Cordova Android project ships them,
//! plus a builder that lays them out on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Descriptor without a version code, landscape on Android.
pub const CONFIG_XML: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<widget id="com.app.demo" version="1.2.0" xmlns="http://www.w3.org/ns/widgets" xmlns:cdv="http://cordova.apache.org/ns/1.0">
    <name>Demo App</name>
    <description>
        A sample application
    </description>
    <author email="dev@cordova.apache.org" href="https://cordova.apache.org">
        Apache Cordova Team
    </author>
    <content src="index.html" />
    <allow-intent href="http://*/*" />
    <allow-intent href="https://*/*" />
    <icon src="www/img/72x72.png" width="72" height="72" density="hdpi" />
    <icon src="www/img/96x96.png" width="96" height="96" density="xhdpi" />
    <platform name="android">
        <preference name="AndroidXEnabled" value="true" />
        <preference name="Orientation" value="landscape" />
    </platform>
</widget>
"#;

pub const BUILD_GRADLE: &str = r#"apply plugin: 'com.android.application'

android {
    namespace "com.app.demo"
    compileSdkVersion 35

    defaultConfig {
        applicationId "com.app.demo"
        minSdkVersion 21
        targetSdkVersion 35
        versionCode 7
        versionName "1.2.0"
    }

    signingConfigs {
        release {
            storeFile file("../../../package.keystore")
            keyAlias "release"
        }
    }
}

dependencies {
    implementation fileTree(dir: 'libs', include: '*.jar')
}
"#;

pub const ANDROID_MANIFEST: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<manifest android:hardwareAccelerated="true" android:versionCode="10200" android:versionName="1.2.0" package="com.app.demo" xmlns:android="http://schemas.android.com/apk/res/android">
    <supports-screens android:anyDensity="true" android:largeScreens="true" android:normalScreens="true" />
    <uses-permission android:name="android.permission.INTERNET" />
    <application android:extractNativeLibs="false" android:hardwareAccelerated="true" android:icon="@mipmap/ic_launcher" android:label="@string/app_name">
        <activity android:configChanges="orientation|keyboardHidden|keyboard|screenSize|locale" android:exported="true" android:label="@string/activity_name" android:launchMode="singleTop" android:name="MainActivity" android:theme="@style/Theme.App.SplashScreen" android:windowSoftInputMode="adjustResize">
            <intent-filter android:label="@string/launcher_name">
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;

pub const THEMES_XML: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<resources>
    <style name="Theme.App.SplashScreen" parent="Theme.SplashScreen">
        <item name="windowSplashScreenBackground">@color/cdv_splashscreen_background</item>
    </style>
</resources>
"#;

pub const GRADLE_WRAPPER: &str = r#"distributionBase=GRADLE_USER_HOME
distributionPath=wrapper/dists
distributionUrl=https\://services.gradle.org/distributions/gradle-8.7-all.zip
zipStoreBase=GRADLE_USER_HOME
zipStorePath=wrapper/dists
"#;

/// Fixture for a complete project structure.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    /// Files keyed by path relative to the project root.
    pub files: BTreeMap<PathBuf, Vec<u8>>,
}

impl ProjectFixture {
    /// Create a new empty project fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// A project holding only the descriptor.
    pub fn descriptor_only() -> Self {
        Self::new().with_file("config.xml", CONFIG_XML)
    }

    /// A project after `cordova platform add android`.
    pub fn with_android_platform() -> Self {
        let app = "platforms/android/app";
        Self::descriptor_only()
            .with_file(format!("{app}/build.gradle"), BUILD_GRADLE)
            .with_file(format!("{app}/src/main/AndroidManifest.xml"), ANDROID_MANIFEST)
            .with_file(format!("{app}/src/main/res/values/themes.xml"), THEMES_XML)
            .with_file(
                "platforms/android/gradle/wrapper/gradle-wrapper.properties",
                GRADLE_WRAPPER,
            )
            .with_file("www/img/1125x2436.png", &b"\x89PNG\r\n\x1a\nsplash"[..])
    }

    /// Add or replace a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Remove a file.
    pub fn without_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.remove(path.as_ref());
        self
    }

    /// Write this fixture to a real directory.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(base_path)?;
        for (rel_path, content) in &self.files {
            let full_path = base_path.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }
        Ok(base_path.to_path_buf())
    }
}
