//! Language reference catalog.
//!
//! The catalog is loaded from a JSON array of
//! `{ "code", "name", "native", "rtl"? }` rows and keyed by the normalized
//! two-letter code.  It answers three questions for the rest of the engine:
//! does a language code exist, is it written right-to-left, and what label
//! should the UI show for it.
//!
//! # Failure modes
//!
//! | Failure            | Behavior                                        |
//! |--------------------|-------------------------------------------------|
//! | File missing       | Minimal built-in table (`en`, `cs`, `ar`)       |
//! | File unparseable   | Built-in `en` only                              |
//! | Row without a code | Row is skipped                                  |
//! | Unknown code query | `exists` false, `display_name` echoes the code  |

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Normalizes a locale identifier to an ISO-639-1-style two-letter code.
///
/// `"cs_CZ"`, `"cs-CZ"`, and `"CS"` all normalize to `"cs"`.  An empty or
/// whitespace-only input normalizes to `"en"` so downstream code never has
/// to handle an empty language code.
pub fn normalize_lang(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        return "en".to_string();
    }
    let code = code.replace('-', "_");
    let base = code.split('_').next().unwrap_or("");
    if base.is_empty() {
        "en".to_string()
    } else {
        base.to_ascii_lowercase()
    }
}

/// One row of the language catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    /// Normalized two-letter code (`"en"`, `"cs"`, ...).
    pub code: String,
    /// Display name in English (`"Czech"`).
    pub name: String,
    /// Display name in the language itself (`"Česky"`).
    pub native: String,
    /// Whether the language is written right-to-left.
    pub rtl: bool,
}

/// Read-only language lookup table.
///
/// A `BTreeMap` keeps the codes sorted, so [`LanguageCatalog::all_codes`]
/// needs no extra sort pass.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    by_code: BTreeMap<String, LanguageEntry>,
}

impl LanguageCatalog {
    /// Loads the catalog from a JSON array file.
    ///
    /// Never fails: a missing file yields the minimal built-in table and an
    /// unparseable file yields a built-in `en`-only table, each with a log
    /// line explaining what happened.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "language catalog not readable; using built-in table"
                );
                return Self::builtin_minimal();
            }
        };

        let rows: Vec<Value> = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(rows)) => rows,
            Ok(_) => {
                warn!(
                    path = %path.display(),
                    "language catalog is not a JSON array; using built-in 'en' only"
                );
                return Self::builtin_english_only();
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "language catalog failed to parse; using built-in 'en' only"
                );
                return Self::builtin_english_only();
            }
        };

        let mut by_code = BTreeMap::new();
        for row in &rows {
            let Some(raw_code) = row.get("code").and_then(Value::as_str) else {
                continue;
            };
            if raw_code.trim().is_empty() {
                continue;
            }
            let code = normalize_lang(raw_code);
            let name = non_empty_string(row.get("name")).unwrap_or_else(|| code.clone());
            let native = non_empty_string(row.get("native")).unwrap_or_else(|| name.clone());
            let rtl = row.get("rtl").map(truthy_flag).unwrap_or(false);
            by_code.insert(
                code.clone(),
                LanguageEntry {
                    code,
                    name,
                    native,
                    rtl,
                },
            );
        }
        Self { by_code }
    }

    /// Minimal built-in table used when the backing file is missing.
    fn builtin_minimal() -> Self {
        let rows = [
            ("en", "English", "English", false),
            ("cs", "Czech", "Česky", false),
            ("ar", "Arabic", "العربية", true),
        ];
        let by_code = rows
            .into_iter()
            .map(|(code, name, native, rtl)| {
                (
                    code.to_string(),
                    LanguageEntry {
                        code: code.to_string(),
                        name: name.to_string(),
                        native: native.to_string(),
                        rtl,
                    },
                )
            })
            .collect();
        Self { by_code }
    }

    /// Built-in table used when the backing file exists but cannot be parsed.
    fn builtin_english_only() -> Self {
        let mut by_code = BTreeMap::new();
        by_code.insert(
            "en".to_string(),
            LanguageEntry {
                code: "en".to_string(),
                name: "English".to_string(),
                native: "English".to_string(),
                rtl: false,
            },
        );
        Self { by_code }
    }

    /// Whether the (normalized) code is present in the catalog.
    pub fn exists(&self, code: &str) -> bool {
        self.by_code.contains_key(&normalize_lang(code))
    }

    /// Whether the language is written right-to-left; unknown codes are LTR.
    pub fn is_rtl(&self, code: &str) -> bool {
        self.by_code
            .get(&normalize_lang(code))
            .map(|entry| entry.rtl)
            .unwrap_or(false)
    }

    /// Human-friendly label for a language code.
    ///
    /// `native` selects the native label over the English one.  Unknown
    /// codes echo the lowercased code so the UI always has something to show.
    pub fn display_name(&self, code: &str, native: bool) -> String {
        match self.by_code.get(&normalize_lang(code)) {
            Some(entry) if native => entry.native.clone(),
            Some(entry) => entry.name.clone(),
            None => code.to_lowercase(),
        }
    }

    /// All known codes, sorted.
    pub fn all_codes(&self) -> Vec<String> {
        self.by_code.keys().cloned().collect()
    }

    /// Full entry lookup, for callers that want every field at once.
    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.by_code.get(&normalize_lang(code))
    }

    /// Number of known languages.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Whether the catalog is empty (never true in practice; the built-in
    /// fallbacks always contain at least `en`).
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Returns the string content of a JSON value if it is a non-empty string.
fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Boolean-like flag parsing: JSON `true`, any nonzero number, or the
/// strings `"1"` / `"true"` (case-insensitive) are truthy.
fn truthy_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
