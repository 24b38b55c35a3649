//! Application services of the TermDesk engine.
//!
//! Each service is a plain struct holding only its own caches; every
//! operation takes the [`crate::domain::Settings`] handle explicitly, so
//! there is no hidden global state anywhere in this layer.

pub mod config_manager;
pub mod localization;
pub mod plugin_registry;

pub use config_manager::{load_config, ConfigError, LoadedConfig};
pub use localization::{LanguageInfo, LocalizationError, LocalizationService};
pub use plugin_registry::{PluginDescriptor, PluginRegistry};
