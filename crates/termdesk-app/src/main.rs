//! TermDesk engine entry point (headless).
//!
//! Wires the core services together and reports what the UI layer would
//! see on startup: settings state, localization, and the resolved theme
//! stylesheet order.  The presentation layer is a separate collaborator;
//! it drives the same services through the library crate.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Settings::load("settings.json")   -- soft-validated record
//!  └─ LocalizationService               -- dictionary + runtime caches
//!  └─ settings.resolve_theme_files()    -- ordered stylesheet paths
//! ```

use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use termdesk_app::application::LocalizationService;
use termdesk_app::domain::Settings;

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("TermDesk engine starting");

    // Load the configuration record; never fails, repairs and warns instead.
    let settings = Settings::load(Path::new("settings.json"));
    for warning in &settings.warnings {
        warn!("{warning}");
    }
    if settings.should_open_settings() {
        info!(
            first_run = settings.is_first_run(),
            "settings screen should open early"
        );
    }

    info!(
        ui_language = %settings.ui_language,
        fallback = %settings.fallback_language,
        rtl = settings.is_rtl(None),
        theme = %settings.theme,
        "active configuration"
    );

    // Localization: resolve a couple of strings the chrome always needs.
    let mut i18n = LocalizationService::new();
    let title = i18n.get(&settings, "app.title", None);
    info!(title = %title, "resolved window title");

    let languages = i18n.available_languages(&settings);
    info!(count = languages.len(), "languages discovered");
    for language in &languages {
        info!(code = %language.code, native = %language.native, rtl = language.rtl, "language");
    }

    // Theme resolution: the ordered stylesheet list the UI would apply.
    let themes = settings.available_themes();
    info!(count = themes.len(), "themes discovered");
    for theme in &themes {
        info!(name = %theme.name, kind = %theme.kind.as_str(), title = %theme.display_title(), "theme");
    }
    let stylesheets = settings.resolve_theme_files(None);
    info!(?stylesheets, "stylesheet load order");

    info!("TermDesk engine ready");
    Ok(())
}
