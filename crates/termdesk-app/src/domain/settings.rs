//! The persistent, soft-validated configuration record.
//!
//! [`Settings`] owns everything the engine needs to know about one
//! installation: file locations, language selection, the write-protection
//! policy, the selected theme, and the four plugin-category sections.
//!
//! # Soft validation (for beginners)
//!
//! Configuration files are edited by hand, so almost nothing about them can
//! be trusted.  Construction therefore never fails: every malformed or
//! missing optional field is coerced to a safe default and a human-readable
//! warning is appended to [`Settings::warnings`] for the UI to display
//! later.  The one invariant construction *guarantees* is that the three
//! language codes (`ui_language`, `fallback_language`, `default_language`)
//! are non-empty and present in the language catalog afterwards; violations
//! are repaired by substituting `"en"`.
//!
//! # Lifecycle
//!
//! There is no hidden singleton.  [`Settings::load`] and
//! [`Settings::from_value`] are plain factories; the composition root owns
//! the single instance for the process and passes `&Settings` (or
//! `&mut Settings`) down the call graph, which is also what makes the
//! record trivial to construct in tests.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use termdesk_core::catalog::{normalize_lang, CountryCatalog, LanguageCatalog};
use termdesk_core::locale::detect_system_language;
use termdesk_core::theme::{self, ThemeInfo};

/// JSON object alias used for plugin sections and auth data.
pub type JsonMap = serde_json::Map<String, Value>;

/// Fixed base stylesheet applied before any theme file.
pub const BASE_STYLESHEET: &str = "styles/base.tcss";

const DEFAULT_SCHEMA_VERSION: i64 = 1;
const DEFAULT_LOCALES_PATH: &str = "locales";
const DEFAULT_JSONS_PATH: &str = "jsons";
const DEFAULT_LANGUAGES_PATH: &str = "jsons/languages.json";
const DEFAULT_COUNTRIES_PATH: &str = "jsons/countries.json";
const DEFAULT_THEMES_PATH: &str = "themes";

// ── Policy enums ──────────────────────────────────────────────────────────────

/// Policy controlling whether destructive persistence operations require
/// confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteProtection {
    /// Destructive operations are refused outright.
    #[default]
    Strict,
    /// Destructive operations require an explicit confirmation.
    Confirm,
    /// No protection.
    Off,
}

impl WriteProtection {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteProtection::Strict => "strict",
            WriteProtection::Confirm => "confirm",
            WriteProtection::Off => "off",
        }
    }

    /// Parses the on-disk representation; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(WriteProtection::Strict),
            "confirm" => Some(WriteProtection::Confirm),
            "off" => Some(WriteProtection::Off),
            _ => None,
        }
    }
}

impl fmt::Display for WriteProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four plugin-category sections of the configuration record.
///
/// The category is always an explicit tag: plugin descriptors carry it from
/// registration on, and nothing in the engine infers a category from a name
/// or module path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCategory {
    Backends,
    Translators,
    Middleware,
    Communication,
}

impl PluginCategory {
    pub const ALL: [PluginCategory; 4] = [
        PluginCategory::Backends,
        PluginCategory::Translators,
        PluginCategory::Middleware,
        PluginCategory::Communication,
    ];

    /// The configuration-file key of this section.
    pub fn as_str(self) -> &'static str {
        match self {
            PluginCategory::Backends => "backends",
            PluginCategory::Translators => "translators",
            PluginCategory::Middleware => "middleware",
            PluginCategory::Communication => "communication",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for settings persistence.  Loading is infallible by design;
/// only [`Settings::save`] produces these.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error writing settings to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be serialized to JSON.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ── The record ────────────────────────────────────────────────────────────────

/// The configuration record: one per installation, one per process.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    /// Directory relative paths resolve against (the settings file's parent).
    root: PathBuf,

    /// Recoverable issues found during construction, for later UI display.
    pub warnings: Vec<String>,
    /// Issues a human must fix that still should not crash the process.
    /// No producer currently appends here; kept for forward compatibility.
    pub errors: Vec<String>,

    pub schema_version: i64,
    pub locales_path: String,
    pub jsons_path: String,
    pub languages_path: String,
    pub countries_path: String,
    pub write_protection: WriteProtection,
    pub theme: String,
    pub themes_path: String,

    /// Language reference catalog (built-in fallback when the file is gone).
    pub languages: LanguageCatalog,
    /// Country reference catalog (empty when the file is gone).
    pub countries: CountryCatalog,

    pub ui_language: String,
    pub fallback_language: String,
    pub default_language: String,

    pub auth: JsonMap,
    backends: JsonMap,
    translators: JsonMap,
    middleware: JsonMap,
    communication: JsonMap,

    first_run: Option<bool>,
}

impl Settings {
    // ── Construction ──────────────────────────────────────────────────────────

    /// The default configuration tree synthesized for a first run.
    ///
    /// An empty `ui_language` requests system-language autodetection during
    /// construction.
    pub fn default_value() -> Value {
        json!({
            "_first_run": true,
            "app": {
                "schema_version": DEFAULT_SCHEMA_VERSION,
                "locales_path": DEFAULT_LOCALES_PATH,
                "jsons_path": DEFAULT_JSONS_PATH,
                "languages_path": DEFAULT_LANGUAGES_PATH,
                "countries_path": DEFAULT_COUNTRIES_PATH,
                "theme": theme::DEFAULT_THEME,
                "themes_path": DEFAULT_THEMES_PATH,
                "write_protection": WriteProtection::Strict.as_str(),
            },
            "i18n": {
                "ui_language": "",
                "fallback_language": "en",
                "default_language": "en",
            },
            "auth": {},
            "backends": {},
            "translators": {},
            "middleware": {},
            "communication": {},
        })
    }

    /// Normalizes and soft-validates a configuration tree into a record.
    ///
    /// Never fails.  Construction order: path and policy fields, reference
    /// catalogs, i18n fields, plugin sections, language normalization, soft
    /// validation.
    pub fn from_value(data: Value, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut warnings = Vec::new();
        let top = match data {
            Value::Object(map) => map,
            _ => JsonMap::new(),
        };

        // 1) App and file locations, robust against any shape.
        let app = match top.get("app") {
            Some(Value::Object(map)) => map.clone(),
            _ => JsonMap::new(),
        };
        let schema_version = app
            .get("schema_version")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_SCHEMA_VERSION);
        let locales_path = str_field(&app, "locales_path", DEFAULT_LOCALES_PATH);
        let jsons_path = str_field(&app, "jsons_path", DEFAULT_JSONS_PATH);
        let languages_path = str_field(&app, "languages_path", DEFAULT_LANGUAGES_PATH);
        let countries_path = str_field(&app, "countries_path", DEFAULT_COUNTRIES_PATH);
        let theme_name = str_field(&app, "theme", theme::DEFAULT_THEME);
        let themes_path = str_field(&app, "themes_path", DEFAULT_THEMES_PATH);

        let write_protection_raw =
            str_field(&app, "write_protection", WriteProtection::Strict.as_str());
        let write_protection = match WriteProtection::parse(&write_protection_raw) {
            Some(policy) => policy,
            None => {
                warnings.push(format!(
                    "Unknown write_protection '{write_protection_raw}' - using 'strict'."
                ));
                WriteProtection::Strict
            }
        };

        // 2) Reference catalogs, non-fatal when their files are missing.
        let languages = LanguageCatalog::load(&abs_path_in(&root, &languages_path));
        let countries = CountryCatalog::load(&abs_path_in(&root, &countries_path));

        // 3) i18n fields; an empty ui_language requests autodetection.
        let i18n = match top.get("i18n") {
            Some(Value::Object(map)) => map.clone(),
            _ => JsonMap::new(),
        };
        let ui_language = str_field(&i18n, "ui_language", "");
        let fallback_language = str_field(&i18n, "fallback_language", "en");
        let default_language = str_field(&i18n, "default_language", "en");

        // 4) Plugin sections and auth, each coerced to an object.
        let auth = object_section(&top, "auth", &mut warnings);
        let backends = object_section(&top, "backends", &mut warnings);
        let translators = object_section(&top, "translators", &mut warnings);
        let middleware = object_section(&top, "middleware", &mut warnings);
        let communication = object_section(&top, "communication", &mut warnings);

        let first_run = match top.get("_first_run") {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        };

        let mut settings = Self {
            path,
            root,
            warnings,
            errors: Vec::new(),
            schema_version,
            locales_path,
            jsons_path,
            languages_path,
            countries_path,
            write_protection,
            theme: theme_name,
            themes_path,
            languages,
            countries,
            ui_language,
            fallback_language,
            default_language,
            auth,
            backends,
            translators,
            middleware,
            communication,
            first_run,
        };

        // 5) Language normalization (fills ui_language when empty).
        settings.normalize_languages();
        // 6) Soft validation of directory existence.
        settings.soft_validate();
        settings
    }

    /// Loads the record from disk.
    ///
    /// Never fails: a missing file, an empty file, and a parse failure all
    /// synthesize the in-memory default configuration marked first-run; the
    /// latter two additionally record a warning naming the problem.  The
    /// defaults are never written back automatically.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file absent; starting first run");
                return Self::from_value(Self::default_value(), path);
            }
            Err(e) => return Self::defaults_with_warning(path, &e.to_string()),
        };

        if raw.trim().is_empty() {
            return Self::defaults_with_warning(path, "empty settings file");
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(data @ Value::Object(_)) => Self::from_value(data, path),
            Ok(_) => Self::defaults_with_warning(path, "top-level value is not a JSON object"),
            Err(e) => Self::defaults_with_warning(path, &e.to_string()),
        }
    }

    fn defaults_with_warning(path: PathBuf, detail: &str) -> Self {
        let mut settings = Self::from_value(Self::default_value(), path);
        settings.warnings.push(format!(
            "Settings file '{}' could not be parsed (using in-memory defaults): {detail}",
            settings.path.display()
        ));
        settings
    }

    // ── Validation & normalization ────────────────────────────────────────────

    /// Ensures all three language codes are normalized, non-empty, and
    /// present in the catalog; repairs violations with `"en"` + warning.
    fn normalize_languages(&mut self) {
        self.fallback_language = normalize_lang(&self.fallback_language);
        self.default_language = normalize_lang(&self.default_language);

        if self.ui_language.trim().is_empty() {
            self.ui_language = detect_system_language();
            debug!(language = %self.ui_language, "autodetected UI language");
        }
        self.ui_language = normalize_lang(&self.ui_language);

        if !self.languages.exists(&self.ui_language) {
            self.warnings.push(format!(
                "Unknown UI language '{}' - falling back to 'en'.",
                self.ui_language
            ));
            self.ui_language = "en".to_string();
        }
        if !self.languages.exists(&self.fallback_language) {
            self.warnings.push(format!(
                "Unknown fallback language '{}' - using 'en'.",
                self.fallback_language
            ));
            self.fallback_language = "en".to_string();
        }
        if !self.languages.exists(&self.default_language) {
            self.warnings.push(format!(
                "Unknown default language '{}' - using 'en'.",
                self.default_language
            ));
            self.default_language = "en".to_string();
        }
    }

    /// Collects fixable issues as warnings; nothing here ever fails.
    fn soft_validate(&mut self) {
        if !self.abs_path(&self.jsons_path).exists() {
            self.warnings.push(format!(
                "Helper JSONs folder '{}' does not exist yet. It will be created on demand.",
                self.jsons_path
            ));
        }
        if !self.abs_path(&self.locales_path).exists() {
            self.warnings.push(format!(
                "Locales path '{}' does not exist yet. It will be created on demand.",
                self.locales_path
            ));
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Serializes the record back to its path.
    ///
    /// Transient state (warnings, errors, loaded catalogs) is excluded and
    /// `_first_run` is persisted as `false`.  Key order is deterministic,
    /// so repeated saves with no mutation are byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] for file-system failures and
    /// [`SettingsError::Serialize`] if encoding fails.
    pub fn save(&self) -> Result<(), SettingsError> {
        let data = json!({
            "app": {
                "schema_version": self.schema_version,
                "locales_path": self.locales_path,
                "jsons_path": self.jsons_path,
                "languages_path": self.languages_path,
                "countries_path": self.countries_path,
                "write_protection": self.write_protection.as_str(),
                "theme": self.theme,
                "themes_path": self.themes_path,
            },
            "i18n": {
                "ui_language": self.ui_language,
                "fallback_language": self.fallback_language,
                "default_language": self.default_language,
            },
            "auth": self.auth,
            "backends": self.backends,
            "translators": self.translators,
            "middleware": self.middleware,
            "communication": self.communication,
            "_first_run": false,
        });

        let body = serde_json::to_string_pretty(&data)?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, body).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative configuration paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a configured path against the settings root.
    pub fn abs_path(&self, configured: &str) -> PathBuf {
        abs_path_in(&self.root, configured)
    }

    /// Path of a helper JSON file under the `jsons/` folder, the canonical
    /// place for static catalogs used by the app.
    pub fn helper_json_path(&self, filename: &str) -> PathBuf {
        self.abs_path(&self.jsons_path).join(filename)
    }

    /// Whether this is the first run.
    ///
    /// The explicit marker wins when present; otherwise first-run is
    /// inferred from an essentially empty configuration (no auth, no
    /// backends, no translators, no middleware).
    pub fn is_first_run(&self) -> bool {
        match self.first_run {
            Some(explicit) => explicit,
            None => {
                self.auth.is_empty()
                    && self.backends.is_empty()
                    && self.translators.is_empty()
                    && self.middleware.is_empty()
            }
        }
    }

    /// Whether the app should open the settings screen early: first run, or
    /// any recorded warning or error.
    pub fn should_open_settings(&self) -> bool {
        self.is_first_run() || !self.warnings.is_empty() || !self.errors.is_empty()
    }

    // ── i18n helpers ──────────────────────────────────────────────────────────

    /// Whether the given (or current UI) language is right-to-left.
    pub fn is_rtl(&self, lang: Option<&str>) -> bool {
        let code = lang.unwrap_or(&self.ui_language);
        self.languages.is_rtl(code)
    }

    /// Human-friendly label for a language code.
    pub fn language_display(&self, code: &str, native: bool) -> String {
        self.languages.display_name(code, native)
    }

    /// Switches the UI language (not persisted until [`Settings::save`]).
    pub fn set_language(&mut self, lang: &str) {
        self.ui_language = normalize_lang(lang);
    }

    /// Switches the selected theme (not persisted until [`Settings::save`]).
    pub fn set_theme(&mut self, name: &str) {
        self.theme = name.trim().to_string();
    }

    // ── Theme queries ─────────────────────────────────────────────────────────

    /// Themes discovered in the configured directory, one per logical name,
    /// custom variants preferred.
    pub fn available_themes(&self) -> Vec<ThemeInfo> {
        theme::available_themes(&self.abs_path(&self.themes_path))
    }

    /// Ordered stylesheet list for the given (or currently selected) theme,
    /// always starting with the base stylesheet.
    pub fn resolve_theme_files(&self, name: Option<&str>) -> Vec<PathBuf> {
        let selected = match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.theme,
        };
        theme::resolve_theme_files(
            &self.abs_path(&self.themes_path),
            &self.abs_path(BASE_STYLESHEET),
            selected,
        )
    }

    // ── Plugin sections ───────────────────────────────────────────────────────

    /// Read-only view of one plugin-category section.
    pub fn plugin_section(&self, category: PluginCategory) -> &JsonMap {
        match category {
            PluginCategory::Backends => &self.backends,
            PluginCategory::Translators => &self.translators,
            PluginCategory::Middleware => &self.middleware,
            PluginCategory::Communication => &self.communication,
        }
    }

    fn plugin_section_mut(&mut self, category: PluginCategory) -> &mut JsonMap {
        match category {
            PluginCategory::Backends => &mut self.backends,
            PluginCategory::Translators => &mut self.translators,
            PluginCategory::Middleware => &mut self.middleware,
            PluginCategory::Communication => &mut self.communication,
        }
    }

    /// Options map for a plugin, created on demand.  An entry that drifted
    /// to a non-object value is re-coerced to an empty map.
    pub fn get_plugin_options(&mut self, category: PluginCategory, name: &str) -> &mut JsonMap {
        let section = self.plugin_section_mut(category);
        let entry = section
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(JsonMap::new()));
        if !entry.is_object() {
            *entry = Value::Object(JsonMap::new());
        }
        entry
            .as_object_mut()
            .expect("entry was just coerced to an object")
    }

    /// Sets the conventional `enabled` flag in a plugin's options.
    pub fn set_plugin_enabled(&mut self, category: PluginCategory, name: &str, enabled: bool) {
        self.get_plugin_options(category, name)
            .insert("enabled".to_string(), Value::Bool(enabled));
    }

    /// Reads the conventional `enabled` flag; absent means disabled.
    pub fn plugin_enabled(&mut self, category: PluginCategory, name: &str) -> bool {
        self.get_plugin_options(category, name)
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

// ── Field extraction helpers ──────────────────────────────────────────────────

fn str_field(map: &JsonMap, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

/// Coerces a top-level section to an object; a present-but-mistyped value
/// earns a warning, absence does not.
fn object_section(top: &JsonMap, key: &str, warnings: &mut Vec<String>) -> JsonMap {
    match top.get(key) {
        Some(Value::Object(map)) => map.clone(),
        None | Some(Value::Null) => JsonMap::new(),
        Some(_) => {
            warnings.push(format!(
                "Section '{key}' should be an object; resetting to empty."
            ));
            JsonMap::new()
        }
    }
}

fn abs_path_in(root: &Path, configured: &str) -> PathBuf {
    let p = Path::new(configured);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("settings.json")
    }

    // ── Construction defaults ─────────────────────────────────────────────────

    #[test]
    fn test_missing_i18n_section_still_yields_valid_ui_language() {
        // Arrange / Act: no i18n section at all, so autodetection runs and
        // whatever it finds is validated against the catalog.
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(json!({}), settings_path(&dir));

        // Assert – the invariant, not a specific language
        assert_eq!(settings.ui_language.len(), 2);
        assert!(settings.languages.exists(&settings.ui_language));
        assert!(settings.languages.exists(&settings.fallback_language));
        assert!(settings.languages.exists(&settings.default_language));
    }

    #[test]
    fn test_unknown_ui_language_repairs_to_en_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(
            json!({"i18n": {"ui_language": "zz"}}),
            settings_path(&dir),
        );

        assert_eq!(settings.ui_language, "en");
        assert!(
            settings
                .warnings
                .iter()
                .any(|w| w.contains("Unknown UI language 'zz'")),
            "warnings were: {:?}",
            settings.warnings
        );
    }

    #[test]
    fn test_language_codes_are_normalized_before_validation() {
        // "cs_CZ" and "CS-cz" both normalize to "cs", which the built-in
        // catalog knows, so no repair happens.
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(
            json!({"i18n": {
                "ui_language": "cs_CZ",
                "fallback_language": "CS-cz",
                "default_language": "EN"
            }}),
            settings_path(&dir),
        );

        assert_eq!(settings.ui_language, "cs");
        assert_eq!(settings.fallback_language, "cs");
        assert_eq!(settings.default_language, "en");
    }

    #[test]
    fn test_unknown_write_protection_defaults_to_strict_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(
            json!({"app": {"write_protection": "yolo"}}),
            settings_path(&dir),
        );

        assert_eq!(settings.write_protection, WriteProtection::Strict);
        assert!(settings
            .warnings
            .iter()
            .any(|w| w.contains("write_protection 'yolo'")));
    }

    #[test]
    fn test_valid_write_protection_values_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(
            json!({"app": {"write_protection": "confirm"}}),
            settings_path(&dir),
        );

        assert_eq!(settings.write_protection, WriteProtection::Confirm);
    }

    #[test]
    fn test_mistyped_plugin_section_is_reset_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(
            json!({"backends": ["not", "an", "object"], "auth": 5}),
            settings_path(&dir),
        );

        assert!(settings.plugin_section(PluginCategory::Backends).is_empty());
        assert!(settings.auth.is_empty());
        assert!(settings
            .warnings
            .iter()
            .any(|w| w.contains("Section 'backends'")));
        assert!(settings.warnings.iter().any(|w| w.contains("Section 'auth'")));
    }

    #[test]
    fn test_non_object_top_level_yields_full_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(json!([1, 2, 3]), settings_path(&dir));

        assert_eq!(settings.theme, "as400");
        assert_eq!(settings.locales_path, "locales");
        assert!(settings.is_first_run());
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_synthesizes_first_run_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");

        let settings = Settings::load(settings_path(&dir));

        assert!(settings.is_first_run());
        assert_eq!(settings.theme, "as400");
        // A plain missing file is the normal first run, not a parse problem.
        assert!(!settings
            .warnings
            .iter()
            .any(|w| w.contains("could not be parsed")));
    }

    #[test]
    fn test_load_unparseable_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = settings_path(&dir);
        std::fs::write(&path, "{ definitely not json").expect("write bad settings");

        let settings = Settings::load(&path);

        assert!(settings.is_first_run());
        assert!(settings
            .warnings
            .iter()
            .any(|w| w.contains("could not be parsed")));
    }

    #[test]
    fn test_load_empty_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = settings_path(&dir);
        std::fs::write(&path, "   \n").expect("write empty settings");

        let settings = Settings::load(&path);

        assert!(settings.is_first_run());
        assert!(settings
            .warnings
            .iter()
            .any(|w| w.contains("empty settings file")));
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    #[test]
    fn test_save_then_load_round_trips_the_record() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = settings_path(&dir);
        let mut settings = Settings::from_value(
            json!({
                "app": {"theme": "paper"},
                "i18n": {"ui_language": "cs", "fallback_language": "en", "default_language": "en"},
                "backends": {"files": {"enabled": true, "path": "/srv/data"}},
            }),
            &path,
        );
        settings.set_plugin_enabled(PluginCategory::Translators, "deepl", true);

        // Act
        settings.save().expect("save must succeed");
        let reloaded = Settings::load(&path);

        // Assert
        assert_eq!(reloaded.ui_language, "cs");
        assert_eq!(reloaded.fallback_language, "en");
        assert_eq!(reloaded.default_language, "en");
        assert_eq!(reloaded.theme, "paper");
        assert_eq!(
            reloaded.plugin_section(PluginCategory::Backends),
            settings.plugin_section(PluginCategory::Backends)
        );
        assert_eq!(
            reloaded.plugin_section(PluginCategory::Translators),
            settings.plugin_section(PluginCategory::Translators)
        );
        assert!(!reloaded.is_first_run(), "save persists _first_run: false");
    }

    #[test]
    fn test_save_is_idempotent_byte_for_byte() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = settings_path(&dir);
        let settings = Settings::from_value(json!({"i18n": {"ui_language": "en"}}), &path);

        settings.save().expect("first save");
        let first = std::fs::read(&path).expect("read first save");
        settings.save().expect("second save");
        let second = std::fs::read(&path).expect("read second save");

        assert_eq!(first, second);
    }

    // ── First-run and settings-screen guidance ────────────────────────────────

    #[test]
    fn test_first_run_inferred_from_essentially_empty_config() {
        let dir = tempfile::tempdir().expect("tempdir");

        // No marker, nothing configured: inferred first run.
        let empty = Settings::from_value(
            json!({"i18n": {"ui_language": "en"}}),
            settings_path(&dir),
        );
        assert!(empty.is_first_run());

        // No marker but a backend configured: not a first run.
        let configured = Settings::from_value(
            json!({"backends": {"files": {}}, "i18n": {"ui_language": "en"}}),
            settings_path(&dir),
        );
        assert!(!configured.is_first_run());
    }

    #[test]
    fn test_explicit_first_run_marker_wins_over_inference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(
            json!({"_first_run": false, "i18n": {"ui_language": "en"}}),
            settings_path(&dir),
        );

        assert!(!settings.is_first_run());
    }

    #[test]
    fn test_should_open_settings_on_warnings_even_after_first_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut settings = Settings::from_value(
            json!({
                "_first_run": false,
                "backends": {"files": {}},
                "i18n": {"ui_language": "en"}
            }),
            settings_path(&dir),
        );
        settings.warnings.clear();
        assert!(!settings.should_open_settings());

        settings.warnings.push("something to review".to_string());
        assert!(settings.should_open_settings());
    }

    // ── Paths ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_abs_path_resolves_relative_against_settings_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(json!({}), settings_path(&dir));

        assert_eq!(settings.abs_path("locales"), dir.path().join("locales"));
        assert_eq!(
            settings.abs_path("/absolute/stays"),
            PathBuf::from("/absolute/stays")
        );
    }

    #[test]
    fn test_helper_json_path_lives_under_jsons_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(json!({}), settings_path(&dir));

        assert_eq!(
            settings.helper_json_path("emojis.json"),
            dir.path().join("jsons").join("emojis.json")
        );
    }

    // ── Plugin options ────────────────────────────────────────────────────────

    #[test]
    fn test_plugin_enabled_defaults_to_false_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut settings = Settings::from_value(json!({}), settings_path(&dir));

        assert!(!settings.plugin_enabled(PluginCategory::Backends, "files"));

        settings.set_plugin_enabled(PluginCategory::Backends, "files", true);
        assert!(settings.plugin_enabled(PluginCategory::Backends, "files"));
    }

    #[test]
    fn test_get_plugin_options_recoerces_drifted_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut settings = Settings::from_value(
            json!({"middleware": {"audit": "oops, a string"}}),
            settings_path(&dir),
        );

        let options = settings.get_plugin_options(PluginCategory::Middleware, "audit");

        assert!(options.is_empty(), "non-object entry is reset to a map");
    }

    // ── Theme delegation ──────────────────────────────────────────────────────

    #[test]
    fn test_resolve_theme_files_uses_configured_theme_and_root() {
        // Arrange: a real theme file next to the settings file.
        let dir = tempfile::tempdir().expect("tempdir");
        let themes_dir = dir.path().join("themes");
        std::fs::create_dir_all(&themes_dir).expect("mkdir themes");
        std::fs::write(themes_dir.join("paper.custom.tcss"), "Screen {}")
            .expect("write theme");
        let settings = Settings::from_value(
            json!({"app": {"theme": "paper"}, "i18n": {"ui_language": "en"}}),
            settings_path(&dir),
        );

        // Act
        let files = settings.resolve_theme_files(None);

        // Assert – base stylesheet first, then the custom variant.
        assert_eq!(files[0], dir.path().join(BASE_STYLESHEET));
        assert!(files[1].ends_with("paper.custom.tcss"));
    }

    #[test]
    fn test_resolve_theme_files_without_matches_returns_only_base() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::from_value(json!({}), settings_path(&dir));

        let files = settings.resolve_theme_files(Some("nope"));

        assert_eq!(files, vec![dir.path().join(BASE_STYLESHEET)]);
    }
}
