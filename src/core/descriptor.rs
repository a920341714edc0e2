//! `config.xml` descriptor parsing and generation.
//!
//! The descriptor is the authoritative source for the app identity, version
//! and orientation. Parsing is permissive (either spelling of the version
//! code attribute, optional child elements); generation always emits the
//! canonical spelling and a fixed Android preference block.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::core::error::SyncError;

/// Name of the descriptor root element.
pub const ROOT_ELEMENT: &str = "widget";

/// Canonical spelling of the build version code attribute.
pub const VERSION_CODE_ATTR: &str = "android-versionCode";

/// Alternate spelling some tools write instead of [`VERSION_CODE_ATTR`].
pub const VERSION_CODE_ATTR_ALT: &str = "android:versionCode";

/// Entry point used when `<content src>` is absent.
pub const DEFAULT_ENTRY_CONTENT: &str = "index.html";

/// Screen orientation preference for the Android platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
    Default,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
            Orientation::Default => "default",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            "default" => Ok(Orientation::Default),
            _ => Err(format!(
                "invalid orientation '{}'; expected 'portrait', 'landscape', or 'default'",
                s
            )),
        }
    }
}

/// The editable subset of `config.xml`.
///
/// `id` and `version_name` are empty only when the source file lacks the
/// corresponding attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Reverse-domain application identifier
    pub id: String,
    /// Display version string
    pub version_name: String,
    /// Monotonic build number, kept as text
    pub version_code: String,
    pub display_name: String,
    pub description: String,
    pub author: String,
    /// Path of the app entry point
    pub entry_content: String,
    pub orientation: Orientation,
}

impl Default for ProjectDescriptor {
    fn default() -> Self {
        ProjectDescriptor {
            id: String::new(),
            version_name: String::new(),
            version_code: String::new(),
            display_name: String::new(),
            description: String::new(),
            author: String::new(),
            entry_content: DEFAULT_ENTRY_CONTENT.to_string(),
            orientation: Orientation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Name,
    Description,
    Author,
}

impl TextField {
    fn from_element(name: &str) -> Option<Self> {
        match name {
            "name" => Some(TextField::Name),
            "description" => Some(TextField::Description),
            "author" => Some(TextField::Author),
            _ => None,
        }
    }
}

/// Incremental state while walking the descriptor events.
#[derive(Default)]
struct ParseState {
    descriptor: ProjectDescriptor,
    stack: Vec<String>,
    root_seen: bool,
    capture: Option<TextField>,
    captured: String,
    seen_text: Vec<TextField>,
    seen_content: bool,
    seen_orientation: bool,
    android_platform_depth: Option<usize>,
}

impl ParseState {
    fn open(&mut self, element: &BytesStart<'_>, has_children: bool) -> Result<(), SyncError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let depth = self.stack.len();

        if depth == 0 {
            if self.root_seen {
                return Err(SyncError::malformed(format!(
                    "unexpected second root element <{}>",
                    name
                )));
            }
            if name != ROOT_ELEMENT {
                return Err(SyncError::malformed(format!(
                    "expected <{}> root element, found <{}>",
                    ROOT_ELEMENT, name
                )));
            }
            self.root_seen = true;
            self.read_root(element)?;
        } else if depth == 1 {
            self.open_child(&name, element, has_children)?;
        }

        if name == "platform"
            && self.android_platform_depth.is_none()
            && attribute(element, "name")?.as_deref() == Some("android")
            && has_children
        {
            self.android_platform_depth = Some(depth);
        }

        if name == "preference" && !self.seen_orientation && self.in_android_platform(depth) {
            if attribute(element, "name")?.as_deref() == Some("Orientation") {
                self.seen_orientation = true;
                let value = attribute(element, "value")?.unwrap_or_default();
                self.descriptor.orientation = value.parse().unwrap_or_else(|e| {
                    tracing::warn!("{}; falling back to portrait", e);
                    Orientation::Portrait
                });
            }
        }

        if has_children {
            self.stack.push(name);
        }
        Ok(())
    }

    fn in_android_platform(&self, depth: usize) -> bool {
        matches!(self.android_platform_depth, Some(platform) if depth > platform)
    }

    fn read_root(&mut self, root: &BytesStart<'_>) -> Result<(), SyncError> {
        self.descriptor.id = attribute(root, "id")?.unwrap_or_default();
        self.descriptor.version_name = attribute(root, "version")?.unwrap_or_default();

        let primary = attribute(root, VERSION_CODE_ATTR)?.filter(|v| !v.is_empty());
        let code = match primary {
            Some(code) => Some(code),
            None => attribute(root, VERSION_CODE_ATTR_ALT)?,
        };
        self.descriptor.version_code = code.unwrap_or_default();
        Ok(())
    }

    fn open_child(
        &mut self,
        name: &str,
        element: &BytesStart<'_>,
        has_children: bool,
    ) -> Result<(), SyncError> {
        if let Some(field) = TextField::from_element(name) {
            if !self.seen_text.contains(&field) {
                self.seen_text.push(field);
                if has_children {
                    self.capture = Some(field);
                    self.captured.clear();
                }
            }
        } else if name == "content" && !self.seen_content {
            self.seen_content = true;
            if let Some(src) = attribute(element, "src")? {
                self.descriptor.entry_content = src;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SyncError> {
        if self.stack.pop().is_none() {
            return Err(SyncError::malformed("unbalanced closing tag"));
        }
        let depth = self.stack.len();

        if depth == 1 {
            if let Some(field) = self.capture.take() {
                let text = self.captured.trim().to_string();
                match field {
                    TextField::Name => self.descriptor.display_name = text,
                    TextField::Description => self.descriptor.description = text,
                    TextField::Author => self.descriptor.author = text,
                }
            }
        }

        if self.android_platform_depth == Some(depth) {
            self.android_platform_depth = None;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), SyncError> {
        if self.stack.is_empty() {
            if !text.trim().is_empty() {
                return Err(SyncError::malformed("text outside the root element"));
            }
            return Ok(());
        }
        if self.capture.is_some() {
            self.captured.push_str(text);
        }
        Ok(())
    }
}

/// Parse descriptor text into a [`ProjectDescriptor`].
pub fn parse(text: &str) -> Result<ProjectDescriptor, SyncError> {
    let mut reader = Reader::from_str(text);
    let mut state = ParseState::default();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(SyncError::MalformedDescriptor {
                    reason: e.to_string(),
                    offset: Some(reader.error_position() as usize),
                })
            }
        };

        match event {
            Event::Start(e) => state.open(&e, true)?,
            Event::Empty(e) => state.open(&e, false)?,
            Event::End(_) => state.close()?,
            Event::Text(t) => state.text(&utf8(&t)?)?,
            Event::CData(c) => state.text(&utf8(&c)?)?,
            Event::GeneralRef(r) => {
                let resolved = resolve_reference(&utf8(&r)?)?;
                state.text(&resolved)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.root_seen {
        return Err(SyncError::malformed(format!(
            "missing <{}> root element",
            ROOT_ELEMENT
        )));
    }
    if let Some(open) = state.stack.last() {
        return Err(SyncError::malformed(format!("unclosed <{}> element", open)));
    }

    Ok(state.descriptor)
}

/// Icon declarations keyed by `WIDTHxHEIGHT`.
///
/// Declarations missing any of `src`, `width` or `height` are ignored.
pub fn icons(text: &str) -> Result<BTreeMap<String, String>, SyncError> {
    let mut reader = Reader::from_str(text);
    let mut icons = BTreeMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"icon" => {
                let src = attribute(&e, "src")?.unwrap_or_default();
                let width = attribute(&e, "width")?.unwrap_or_default();
                let height = attribute(&e, "height")?.unwrap_or_default();
                if !src.is_empty() && !width.is_empty() && !height.is_empty() {
                    icons.insert(format!("{}x{}", width, height), src);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SyncError::MalformedDescriptor {
                    reason: e.to_string(),
                    offset: Some(reader.error_position() as usize),
                })
            }
        }
    }

    Ok(icons)
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, SyncError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| SyncError::malformed(e.to_string()))?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| SyncError::malformed(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn utf8(bytes: &[u8]) -> Result<String, SyncError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| SyncError::malformed(format!("invalid UTF-8: {}", e)))
}

fn resolve_reference(name: &str) -> Result<String, SyncError> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        return code
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| SyncError::malformed(format!("invalid character reference &{};", name)));
    }

    resolve_xml_entity(name)
        .map(str::to_string)
        .ok_or_else(|| SyncError::malformed(format!("unknown entity &{};", name)))
}

/// Generate canonical `config.xml` text for a descriptor.
///
/// Output depends only on the descriptor value. Every field is escaped by
/// the writer, so generation never fails.
pub fn generate(descriptor: &ProjectDescriptor) -> String {
    let mut xml = Writer::new_with_indent(Vec::with_capacity(3072), b' ', 4);
    if let Err(e) = write_widget(&mut xml, descriptor) {
        // Unreachable with an in-memory sink.
        tracing::error!("descriptor generation failed: {:#}", e);
    }
    let mut out = String::from_utf8_lossy(&xml.into_inner()).into_owned();
    out.push('\n');
    out
}

fn write_widget<W: Write>(xml: &mut Writer<W>, d: &ProjectDescriptor) -> anyhow::Result<()> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("id", d.id.as_str()));
    root.push_attribute(("version", d.version_name.as_str()));
    root.push_attribute((VERSION_CODE_ATTR, d.version_code.as_str()));
    root.push_attribute(("xmlns", WIDGETS_NS));
    root.push_attribute(("xmlns:cdv", CORDOVA_NS));
    xml.write_event(Event::Start(root))?;

    write_text_element(xml, BytesStart::new("name"), &d.display_name)?;
    write_text_element(xml, BytesStart::new("description"), &d.description)?;
    let mut author = BytesStart::new("author");
    author.push_attribute(("email", ""));
    author.push_attribute(("href", ""));
    write_text_element(xml, author, &d.author)?;

    let mut content = BytesStart::new("content");
    content.push_attribute(("src", d.entry_content.as_str()));
    xml.write_event(Event::Empty(content))?;

    for href in ALLOWED_INTENTS {
        let mut intent = BytesStart::new("allow-intent");
        intent.push_attribute(("href", href));
        xml.write_event(Event::Empty(intent))?;
    }
    for (size, density) in ICON_DENSITIES {
        let src = format!("www/img/{size}x{size}.png");
        let size = size.to_string();
        let mut icon = BytesStart::new("icon");
        icon.push_attribute(("src", src.as_str()));
        icon.push_attribute(("width", size.as_str()));
        icon.push_attribute(("height", size.as_str()));
        icon.push_attribute(("density", density));
        xml.write_event(Event::Empty(icon))?;
    }
    let mut splash = BytesStart::new("splash");
    splash.push_attribute(("src", SPLASH_SRC));
    xml.write_event(Event::Empty(splash))?;

    let mut platform = BytesStart::new("platform");
    platform.push_attribute(("name", "android"));
    xml.write_event(Event::Start(platform))?;
    for (name, value) in ANDROID_PREFERENCES {
        write_preference(xml, name, value)?;
    }
    write_preference(xml, "Orientation", d.orientation.as_str())?;
    xml.write_event(Event::End(BytesEnd::new("platform")))?;

    xml.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    Ok(())
}

fn write_preference<W: Write>(xml: &mut Writer<W>, name: &str, value: &str) -> anyhow::Result<()> {
    let mut pref = BytesStart::new("preference");
    pref.push_attribute(("name", name));
    pref.push_attribute(("value", value));
    xml.write_event(Event::Empty(pref))?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> anyhow::Result<()> {
    let end = start.to_end().into_owned();
    xml.write_event(Event::Start(start))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(end))?;
    Ok(())
}

const WIDGETS_NS: &str = "http://www.w3.org/ns/widgets";
const CORDOVA_NS: &str = "http://cordova.apache.org/ns/1.0";

const ALLOWED_INTENTS: [&str; 2] = ["http://*/*", "https://*/*"];

const ICON_DENSITIES: [(u32, &str); 4] = [
    (72, "hdpi"),
    (96, "xhdpi"),
    (144, "xxhdpi"),
    (192, "xxxhdpi"),
];

const SPLASH_SRC: &str = "www/img/icon4.png";

/// Fixed Android preferences; `Orientation` is appended from the descriptor.
const ANDROID_PREFERENCES: &[(&str, &str)] = &[
    ("AndroidXEnabled", "true"),
    ("AndroidInsecureFileModeEnabled", "true"),
    ("AndroidWindowSplashScreenShow", "false"),
    ("AndroidPersistentFileLocation", "Compatibility"),
    (
        "AndroidExtraFilesystems",
        "files,files-external,documents,sdcard,cache,cache-external,assets",
    ),
    ("EnableViewportScale", "true"),
    ("MediaPlaybackRequiresUserAction", "false"),
    ("SuppressesIncrementalRendering", "false"),
    ("UIWebViewBounce", "false"),
    ("BackupWebStorage", "none"),
    ("KeyboardDisplayRequiresUserAction", "true"),
    ("AndroidExtractNativeLibs", "false"),
    ("AndroidGradlePluginVersion", "8.7.3"),
    ("AndroidTargetSdkVersion", "35"),
    ("AndroidMinSdkVersion", "21"),
    ("AndroidCompileSdkVersion", "35"),
    ("AndroidLargeHeap", "true"),
    ("AndroidHardwareAccelerated", "true"),
    ("AndroidUsesCleartextTraffic", "true"),
];
