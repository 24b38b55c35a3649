//! # termdesk-core
//!
//! Shared foundation for the TermDesk terminal application: language and
//! country reference catalogs, system-locale detection, the encrypted-field
//! codec, and the theme-file resolver.
//!
//! This crate is used by the application engine and by any future tooling
//! (migration scripts, translation linters).  It has zero dependencies on UI
//! frameworks or terminal backends; every filesystem operation takes an
//! explicit path so callers stay in control of where data lives.
//!
//! # Architecture overview (for beginners)
//!
//! TermDesk is a desktop-style terminal application.  Its engine manages
//! three intertwined concerns, and this crate holds the parts of them that
//! are pure data plus blocking file reads:
//!
//! - **`catalog`** – Static reference tables loaded from JSON: which
//!   languages exist (code, display name, native name, right-to-left flag)
//!   and which countries exist.  Loaded once, read-only afterwards, with
//!   built-in fallbacks when the backing files are missing.
//!
//! - **`locale`** – Best-effort detection of the operating system's UI
//!   language, consulted when the configuration asks for autodetection.
//!
//! - **`secrets`** – A recursive transform over a parsed JSON tree that
//!   replaces marked ciphertext strings with plaintext via the [`Decrypt`]
//!   port.  The encryption algorithm itself lives behind that port.
//!
//! - **`theme`** – Discovery and classification of theme stylesheet files,
//!   metadata extraction from their leading comment block, and the
//!   deterministic load-order resolution with fallback.

// Declare the four top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/theme/mod.rs).
pub mod catalog;
pub mod locale;
pub mod secrets;
pub mod theme;

// Re-export the most-used items at the crate root so callers can write
// `termdesk_core::LanguageCatalog` instead of the full module path.
pub use catalog::{normalize_lang, CountryCatalog, LanguageCatalog, LanguageEntry};
pub use locale::detect_system_language;
pub use secrets::{decrypt_tree, Decrypt, DecryptError, SecretError, SECRET_MARKER};
pub use theme::{
    available_themes, resolve_theme_files, scan_themes, ThemeInfo, ThemeKind, DEFAULT_THEME,
};
