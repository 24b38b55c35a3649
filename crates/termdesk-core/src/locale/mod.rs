//! Best-effort system UI-language detection.
//!
//! Consulted only when the configuration leaves `ui_language` empty to
//! request autodetection.  Sources are tried in a fixed priority order and
//! the first non-empty candidate wins:
//!
//! 1. The operating system locale reported by the `sys-locale` crate.
//! 2. The `LANG`, `LC_ALL`, and `LC_MESSAGES` environment variables.
//! 3. The constant `"en"`.
//!
//! The chosen candidate is normalized to a two-letter lowercase code; the
//! caller is responsible for validating it against the language catalog
//! (an exotic `LANG` value such as `C.UTF-8` normalizes to something the
//! catalog will reject, which downgrades to `"en"` with a warning there).

use crate::catalog::normalize_lang;

/// Detects the system UI language as a normalized two-letter code.
///
/// Never fails; returns `"en"` when nothing usable is set.
pub fn detect_system_language() -> String {
    let env = |key: &str| std::env::var(key).ok();
    resolve_candidates(
        sys_locale::get_locale(),
        env("LANG"),
        env("LC_ALL"),
        env("LC_MESSAGES"),
    )
}

/// Pure decision core over already-fetched candidates, so tests never have
/// to mutate process environment.
fn resolve_candidates(
    system: Option<String>,
    lang: Option<String>,
    lc_all: Option<String>,
    lc_messages: Option<String>,
) -> String {
    for candidate in [system, lang, lc_all, lc_messages].into_iter().flatten() {
        if !candidate.trim().is_empty() {
            return normalize_lang(&candidate);
        }
    }
    "en".to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
