//! Theme-file discovery, metadata, and load-order resolution.
//!
//! Themes are stylesheet files living in a single directory.  A file is a
//! theme exactly when its name matches `<name>[.custom].tcss` (extension
//! and `.custom` qualifier compared case-insensitively); everything else in
//! the directory is ignored.  Two files may share a logical name, one
//! system (`mono.tcss`) and one custom (`mono.custom.tcss`); the custom
//! variant always takes precedence.
//!
//! Metadata lives in the first `/* ... */` comment block at the top of the
//! file and is either a JSON object or line-oriented `@key: value` pairs:
//!
//! ```text
//! /*
//!  * @title: Mono
//!  * @description: Single-hue calm
//!  * @tags: dark, minimal
//!  */
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Theme file extension, without the leading dot.
pub const THEME_EXTENSION: &str = "tcss";

/// Qualifier that marks a user-supplied override of a system theme.
pub const CUSTOM_QUALIFIER: &str = "custom";

/// Hard-coded default theme used as the resolution fallback.
pub const DEFAULT_THEME: &str = "as400";

/// Whether a theme file ships with the application or was user-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    System,
    Custom,
}

impl ThemeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKind::System => "system",
            ThemeKind::Custom => "custom",
        }
    }
}

/// A discovered theme file plus the metadata parsed from its header block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeInfo {
    /// Logical name: the filename stem without the custom qualifier.
    pub name: String,
    /// Full path of the file.
    pub path: PathBuf,
    pub kind: ThemeKind,
    pub title: String,
    pub description: String,
    /// Language the title/description are written in.
    pub meta_lang: String,
    pub author: String,
    pub version: String,
    pub tags: Vec<String>,
}

impl ThemeInfo {
    /// Title for UI display, falling back to the logical name.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// Splits a file name into `(logical_name, kind)`.
///
/// Returns `None` for anything that is not a theme file: wrong extension,
/// empty stem, or a stem containing characters outside `[a-z0-9_-]`
/// (checked case-insensitively; the returned name is lowercased).
pub fn parse_theme_file_name(file_name: &str) -> Option<(String, ThemeKind)> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case(THEME_EXTENSION) {
        return None;
    }

    let (base, kind) = match stem.rsplit_once('.') {
        Some((base, qualifier)) if qualifier.eq_ignore_ascii_case(CUSTOM_QUALIFIER) => {
            (base, ThemeKind::Custom)
        }
        _ => (stem, ThemeKind::System),
    };

    if base.is_empty()
        || !base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    Some((base.to_ascii_lowercase(), kind))
}

/// Metadata fields extracted from a theme header block.
#[derive(Debug, Clone, Default, PartialEq)]
struct ThemeMeta {
    title: String,
    description: String,
    lang: String,
    author: String,
    version: String,
    tags: Vec<String>,
}

/// Returns the content of the leading `/* ... */` block, if any.
///
/// Only whitespace may precede the block; a comment appearing after any
/// other content is not metadata.
fn first_comment_block(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let inner = trimmed.strip_prefix("/*")?;
    let end = inner.find("*/")?;
    Some(&inner[..end])
}

/// Parses the header block: structured JSON first, `@key: value` fallback.
fn parse_theme_meta(text: &str) -> ThemeMeta {
    let Some(block) = first_comment_block(text) else {
        return ThemeMeta::default();
    };
    let block = block.trim();

    match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(map)) => {
            let tags = match map.get("tags") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                Some(Value::String(csv)) => split_tags(csv),
                _ => Vec::new(),
            };
            ThemeMeta {
                title: meta_string(&map, "title"),
                description: meta_string(&map, "description"),
                lang: meta_string(&map, "lang"),
                author: meta_string(&map, "author"),
                version: meta_string(&map, "version"),
                tags,
            }
        }
        // Structured data that is not a map counts as absent metadata.
        Ok(_) => ThemeMeta::default(),
        Err(_) => parse_meta_lines(block),
    }
}

/// Line-oriented fallback: `@key: value`, leading `*` decoration stripped.
fn parse_meta_lines(block: &str) -> ThemeMeta {
    let mut meta = ThemeMeta::default();
    for line in block.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        let Some(rest) = line.strip_prefix('@') else {
            continue;
        };
        let Some((key, value)) = rest.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "title" => meta.title = value.to_string(),
            "description" => meta.description = value.to_string(),
            "lang" => meta.lang = value.to_string(),
            "author" => meta.author = value.to_string(),
            "version" => meta.version = value.to_string(),
            "tags" => meta.tags = split_tags(value),
            // Unknown keys are tolerated so themes can carry extra notes.
            _ => {}
        }
    }
    meta
}

fn split_tags(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// String-ish metadata value: strings verbatim, scalars stringified.
fn meta_string(map: &serde_json::Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Scans `dir` for theme files and parses each one's metadata.
///
/// Unreadable files still appear, with empty metadata; a missing directory
/// yields an empty list.  Order is unspecified (directory order).
pub fn scan_themes(dir: &Path) -> Vec<ThemeInfo> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "theme directory not readable");
            return Vec::new();
        }
    };

    let mut themes = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((name, kind)) = parse_theme_file_name(file_name) else {
            continue;
        };

        // Read tolerantly: invalid UTF-8 is replaced rather than rejected.
        let text = std::fs::read(&path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        let meta = parse_theme_meta(&text);

        let meta_lang = meta.lang.trim().to_ascii_lowercase();
        themes.push(ThemeInfo {
            name,
            path,
            kind,
            title: meta.title,
            description: meta.description,
            meta_lang: if meta_lang.is_empty() {
                "en".to_string()
            } else {
                meta_lang
            },
            author: meta.author,
            version: meta.version,
            tags: meta.tags,
        });
    }
    themes
}

/// Scans `dir` and returns one entry per logical name, name-sorted, with
/// the custom variant preferred when both exist.
pub fn available_themes(dir: &Path) -> Vec<ThemeInfo> {
    let mut scanned = scan_themes(dir);
    // Sort by name, custom before system for equal names, then drop the
    // later duplicates.
    scanned.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| rank(a.kind).cmp(&rank(b.kind)))
    });
    scanned.dedup_by(|later, earlier| later.name == earlier.name);
    scanned
}

fn rank(kind: ThemeKind) -> u8 {
    match kind {
        ThemeKind::Custom => 0,
        ThemeKind::System => 1,
    }
}

/// Resolves the ordered stylesheet list for a theme selection.
///
/// The result always starts with `base_css`.  The best existing match for
/// `name` follows (custom variant first, then system); when neither file
/// exists the same preference is applied to the [`DEFAULT_THEME`], and as
/// a last resort only the base stylesheet is returned.
pub fn resolve_theme_files(dir: &Path, base_css: &Path, name: &str) -> Vec<PathBuf> {
    let name = name.trim().to_ascii_lowercase();
    let selected = if name.is_empty() {
        DEFAULT_THEME.to_string()
    } else {
        name
    };

    for candidate in [selected.as_str(), DEFAULT_THEME] {
        let custom = dir.join(format!("{candidate}.{CUSTOM_QUALIFIER}.{THEME_EXTENSION}"));
        if custom.is_file() {
            return vec![base_css.to_path_buf(), custom];
        }
        let system = dir.join(format!("{candidate}.{THEME_EXTENSION}"));
        if system.is_file() {
            return vec![base_css.to_path_buf(), system];
        }
    }

    vec![base_css.to_path_buf()]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
