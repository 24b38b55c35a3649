//! Static reference catalogs backed by JSON files.
//!
//! Both catalogs are loaded once at settings construction and are read-only
//! afterwards.  A missing or unparseable backing file is never an error:
//! the language catalog falls back to a minimal built-in table and the
//! country catalog to an empty list, so the engine always starts.

pub mod country;
pub mod language;

pub use country::CountryCatalog;
pub use language::{normalize_lang, LanguageCatalog, LanguageEntry};
