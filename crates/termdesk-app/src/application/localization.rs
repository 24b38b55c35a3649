//! Flat-dictionary localization with mtime-keyed caching.
//!
//! Every language is one JSON object file, `<locales>/<code>.json`, mapping
//! message key to message string.  The default language's file is special
//! by convention: it maps every key to itself, which makes it both the
//! authoritative key set and the text shown when no translation exists.
//!
//! # Lookup order
//!
//! `get` resolves a key strictly as: requested (or current UI) language if
//! present and non-empty → default language if present and non-empty → the
//! literal key.  An empty value is the explicit "untranslated" marker and
//! never wins a lookup.
//!
//! # Caching
//!
//! Dictionaries are cached together with the file's last-observed
//! modification time.  A lookup re-reads from disk only when the language
//! is not cached yet or the on-disk mtime differs from the cached one;
//! invalidation is time-based, not content-hash-based.  A separate runtime
//! cache holds live-translated strings; it is never persisted.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::Settings;
use crate::infrastructure::translate::Translator;

/// A language discovered in the locale directory, annotated from the
/// language catalog for UI display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub code: String,
    /// Display name (non-native).
    pub name: String,
    /// Native display name.
    pub native: String,
    pub rtl: bool,
    pub path: PathBuf,
}

/// Error type for localization operations.
///
/// Reads never fail (a missing or broken dictionary is just empty); these
/// come from persisting dictionaries and from placeholder substitution.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// A file system I/O error occurred while writing a dictionary.
    #[error("I/O error writing locale file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dictionary could not be serialized.
    #[error("failed to serialize locale dictionary: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A `{name}` placeholder had no matching substitution argument.
    #[error("missing substitution argument '{key}'")]
    MissingArgument { key: String },

    /// A `{` was never closed in the selected string.
    #[error("unclosed substitution placeholder in '{template}'")]
    UnclosedPlaceholder { template: String },
}

/// One cached dictionary plus the mtime observed when it was read.
#[derive(Debug, Clone)]
struct CacheEntry {
    entries: BTreeMap<String, String>,
    /// `None` when the file did not exist at read time.
    mtime: Option<SystemTime>,
}

/// Localization service: dictionary cache, sync/diff against the default
/// language, and the non-persisted runtime translation cache.
#[derive(Debug, Default)]
pub struct LocalizationService {
    cache: HashMap<String, CacheEntry>,
    runtime_cache: HashMap<(String, String, String), String>,
}

impl LocalizationService {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Files & I/O ───────────────────────────────────────────────────────────

    fn lang_file(settings: &Settings, lang: &str) -> PathBuf {
        settings
            .abs_path(&settings.locales_path)
            .join(format!("{}.json", lang.to_ascii_lowercase()))
    }

    fn file_mtime(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// (Re)loads `lang` into the cache when it is absent or its on-disk
    /// mtime differs from the cached one.
    fn ensure_loaded(&mut self, settings: &Settings, lang: &str) {
        let path = Self::lang_file(settings, lang);
        let current_mtime = Self::file_mtime(&path);

        if let Some(entry) = self.cache.get(lang) {
            if entry.mtime == current_mtime {
                return;
            }
            debug!(lang, "locale file changed on disk; reloading");
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(
                        lang,
                        path = %path.display(),
                        error = %e,
                        "locale file is not a flat string map; treating as empty"
                    );
                    BTreeMap::new()
                }
            },
            // Missing file: an empty dictionary, never an error.
            Err(_) => BTreeMap::new(),
        };

        self.cache.insert(
            lang.to_string(),
            CacheEntry {
                entries,
                mtime: current_mtime,
            },
        );
    }

    /// Immutable view of a cached dictionary; call [`Self::ensure_loaded`]
    /// first.
    fn cached(&self, lang: &str) -> &BTreeMap<String, String> {
        &self
            .cache
            .get(lang)
            .expect("ensure_loaded inserts an entry for every language")
            .entries
    }

    /// Persists a dictionary and refreshes its cache entry.
    fn write_lang(
        &mut self,
        settings: &Settings,
        lang: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), LocalizationError> {
        let path = Self::lang_file(settings, lang);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| LocalizationError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_string_pretty(entries)?;
        std::fs::write(&path, body).map_err(|source| LocalizationError::Io {
            path: path.clone(),
            source,
        })?;

        self.cache.insert(
            lang.to_string(),
            CacheEntry {
                entries: entries.clone(),
                mtime: Self::file_mtime(&path),
            },
        );
        debug!(lang, count = entries.len(), "locale dictionary persisted");
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Resolves a localized string: requested (or UI) language → default
    /// language → the key itself.
    pub fn get(&mut self, settings: &Settings, key: &str, lang: Option<&str>) -> String {
        let primary = lang
            .unwrap_or(&settings.ui_language)
            .to_ascii_lowercase();
        let default = settings.default_language.to_ascii_lowercase();

        self.ensure_loaded(settings, &primary);
        self.ensure_loaded(settings, &default);

        if let Some(value) = self.cached(&primary).get(key) {
            if !value.is_empty() {
                return value.clone();
            }
        }
        if let Some(value) = self.cached(&default).get(key) {
            if !value.is_empty() {
                return value.clone();
            }
        }
        key.to_string()
    }

    /// Like [`Self::get`], then applies `{name}` placeholder substitution
    /// to the selected string.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::MissingArgument`] when the selected
    /// string references a placeholder `args` does not provide; substitution
    /// failures are never silently ignored.
    pub fn get_formatted(
        &mut self,
        settings: &Settings,
        key: &str,
        lang: Option<&str>,
        args: &HashMap<String, String>,
    ) -> Result<String, LocalizationError> {
        let template = self.get(settings, key, lang);
        apply_args(&template, args)
    }

    // ── Flat default helpers ──────────────────────────────────────────────────

    /// Ensures the default-language dictionary contains `key → key`,
    /// persisting only when the key was absent.  Idempotent.
    pub fn ensure_default_key(
        &mut self,
        settings: &Settings,
        key: &str,
    ) -> Result<(), LocalizationError> {
        let default = settings.default_language.to_ascii_lowercase();
        self.ensure_loaded(settings, &default);

        if self.cached(&default).contains_key(key) {
            return Ok(());
        }
        let mut entries = self.cached(&default).clone();
        entries.insert(key.to_string(), key.to_string());
        self.write_lang(settings, &default, &entries)
    }

    /// Makes `lang`'s key set exactly equal the default language's: extra
    /// keys are deleted, missing keys are added with an empty value (the
    /// explicit "untranslated" marker).  Persists only when something
    /// changed and reports whether it did.
    pub fn sync_language_with_default(
        &mut self,
        settings: &Settings,
        lang: &str,
    ) -> Result<bool, LocalizationError> {
        let lang = lang.to_ascii_lowercase();
        let default = settings.default_language.to_ascii_lowercase();
        self.ensure_loaded(settings, &default);
        self.ensure_loaded(settings, &lang);

        let source = self.cached(&default).clone();
        let mut target = self.cached(&lang).clone();
        let mut changed = false;

        target.retain(|key, _| {
            let keep = source.contains_key(key);
            if !keep {
                changed = true;
            }
            keep
        });
        for key in source.keys() {
            if !target.contains_key(key) {
                target.insert(key.clone(), String::new());
                changed = true;
            }
        }

        if changed {
            self.write_lang(settings, &lang, &target)?;
        }
        Ok(changed)
    }

    /// Read-only counterpart of [`Self::sync_language_with_default`]:
    /// returns `(missing_keys, extra_keys)` for `lang` versus the default
    /// language without mutating anything.
    pub fn compute_diff_with_default(
        &mut self,
        settings: &Settings,
        lang: &str,
    ) -> (BTreeSet<String>, BTreeSet<String>) {
        let lang = lang.to_ascii_lowercase();
        let default = settings.default_language.to_ascii_lowercase();
        self.ensure_loaded(settings, &default);
        self.ensure_loaded(settings, &lang);

        let source: BTreeSet<&String> = self.cached(&default).keys().collect();
        let target: BTreeSet<&String> = self.cached(&lang).keys().collect();

        let missing = source
            .difference(&target)
            .map(|k| (*k).clone())
            .collect();
        let extra = target
            .difference(&source)
            .map(|k| (*k).clone())
            .collect();
        (missing, extra)
    }

    // ── Language discovery & cache control ────────────────────────────────────

    /// Discovers languages by listing two-letter `*.json` files in the
    /// locale directory, annotated from the language catalog and sorted by
    /// lowercased native label, then code.
    pub fn available_languages(&self, settings: &Settings) -> Vec<LanguageInfo> {
        let base = settings.abs_path(&settings.locales_path);
        let entries = match std::fs::read_dir(&base) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut languages = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(code) = parse_locale_file_name(file_name) else {
                continue;
            };
            languages.push(LanguageInfo {
                name: settings.language_display(&code, false),
                native: settings.language_display(&code, true),
                rtl: settings.is_rtl(Some(&code)),
                code,
                path,
            });
        }

        languages.sort_by(|a, b| {
            (a.native.to_lowercase(), &a.code).cmp(&(b.native.to_lowercase(), &b.code))
        });
        languages
    }

    /// Evicts one language's cache entry, or all of them.  The next access
    /// reloads from disk regardless of mtime.
    pub fn refresh_language_cache(&mut self, lang: Option<&str>) {
        match lang {
            Some(lang) => {
                self.cache.remove(&lang.to_ascii_lowercase());
            }
            None => self.cache.clear(),
        }
    }

    // ── Live translation ──────────────────────────────────────────────────────

    /// Translates UI-adjacent text (theme descriptions, plugin labels) in
    /// memory only; nothing is ever persisted.
    ///
    /// Returns `text` unchanged when source and destination match.  On a
    /// cache miss with a translator supplied, a non-empty result is cached
    /// and returned; a translator failure or empty result is swallowed and
    /// the original text is cached instead, so one flaky backend cannot
    /// break the UI.
    pub fn translate_runtime(
        &mut self,
        settings: &Settings,
        text: &str,
        src_lang: Option<&str>,
        dest_lang: Option<&str>,
        translator: Option<&dyn Translator>,
    ) -> String {
        let src = src_lang
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&settings.default_language)
            .to_ascii_lowercase();
        let dest = dest_lang
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&settings.ui_language)
            .to_ascii_lowercase();

        if src == dest {
            return text.to_string();
        }

        let cache_key = (text.to_string(), src.clone(), dest.clone());
        if let Some(hit) = self.runtime_cache.get(&cache_key) {
            return hit.clone();
        }

        if let Some(translator) = translator {
            match translator.translate(text, &src, &dest) {
                Ok(translated) if !translated.trim().is_empty() => {
                    self.runtime_cache.insert(cache_key, translated.clone());
                    return translated;
                }
                Ok(_) => debug!(%src, %dest, "translator returned an empty result"),
                Err(e) => debug!(%src, %dest, error = %e, "runtime translation failed"),
            }
        }

        // No translation available: remember that, too.
        self.runtime_cache.insert(cache_key, text.to_string());
        text.to_string()
    }
}

/// Accepts `<two ascii letters>.json` (case-insensitive) and returns the
/// lowercased code.
fn parse_locale_file_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".json").or_else(|| {
        // tolerate upper-case extension
        file_name
            .rsplit_once('.')
            .filter(|(_, ext)| ext.eq_ignore_ascii_case("json"))
            .map(|(stem, _)| stem)
    })?;
    if stem.len() == 2 && stem.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(stem.to_ascii_lowercase())
    } else {
        None
    }
}

/// Single-pass `{name}` substitution; `{{` and `}}` escape literal braces.
fn apply_args(
    template: &str,
    args: &HashMap<String, String>,
) -> Result<String, LocalizationError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(LocalizationError::UnclosedPlaceholder {
                                template: template.to_string(),
                            })
                        }
                    }
                }
                match args.get(&name) {
                    Some(value) => out.push_str(value),
                    None => return Err(LocalizationError::MissingArgument { key: name }),
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
