//! Runtime translation port.
//!
//! Used only by the in-memory translation cache for UI-adjacent text such
//! as theme descriptions.  A translator is an optional capability: the
//! localization service treats any failure here as "no translation
//! available" and keeps the original text, so implementations are free to
//! be flaky network services.

use thiserror::Error;

/// Error type for translator backends.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The backend cannot be reached at all.
    #[error("translator backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed the request.
    #[error("translation failed: {0}")]
    Failed(String),
}

/// Port abstracting a live translation capability.
#[cfg_attr(test, mockall::automock)]
pub trait Translator {
    /// Translates `text` from `src` to `dest` (two-letter codes).
    ///
    /// # Errors
    ///
    /// Any [`TranslateError`]; callers treat failures as "no translation".
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String, TranslateError>;
}
