//! Configuration-loading façade.
//!
//! Distinct from [`crate::domain::Settings`]: where the settings record is
//! soft-validated and self-repairing, this loader is the strict path used
//! when the caller explicitly names a configuration file and expects it to
//! be complete.  It reads the file, runs the encrypted-field codec over
//! the whole tree, validates the top-level shape, and populates a
//! [`PluginRegistry`] from the declared backends.
//!
//! # Failure modes
//!
//! Everything here is fatal with a distinct named condition: a missing
//! file, unreadable bytes, malformed JSON, a missing required section, a
//! decryption failure on any field, and a plugin that fails to load.  The
//! caller must not assume partial state is usable after an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use termdesk_core::secrets::{decrypt_tree, Decrypt, SecretError};

use crate::application::plugin_registry::PluginRegistry;
use crate::domain::PluginCategory;
use crate::infrastructure::plugins::{PluginError, PluginLoader};

/// Sections that must be present (as objects) in every explicit config.
const REQUIRED_SECTIONS: [&str; 2] = ["auth", "backends"];

/// Error type for explicit configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The named file does not exist; explicit loads have no default.
    #[error("config file not found: {path}")]
    Missing { path: PathBuf },

    /// A file system I/O error occurred.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON.
    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top-level value is not an object.
    #[error("config root must be a JSON object")]
    NotAnObject,

    /// A required top-level section is absent or not an object.
    #[error("missing required section '{0}'")]
    MissingSection(&'static str),

    /// An encrypted field could not be decrypted.
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// A declared plugin could not be instantiated.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Result of a successful explicit load: the decoded tree plus the
/// registry built from it.
pub struct LoadedConfig {
    /// The full configuration tree with every secret already decrypted.
    pub data: Value,
    /// Plugins instantiated from the `backends` section.  The other three
    /// categories are declared in the file format but not yet wired here.
    pub registry: PluginRegistry,
}

/// Loads, decrypts, validates, and wires an explicit configuration file.
///
/// # Errors
///
/// Every failure is fatal; see [`ConfigError`] for the conditions.
pub fn load_config(
    path: &Path,
    decryptor: &dyn Decrypt,
    loader: &dyn PluginLoader,
) -> Result<LoadedConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let mut data: Value = serde_json::from_str(&raw)?;

    // Decrypt before shape validation so every later consumer, including
    // the plugin loaders, only ever sees plaintext.
    decrypt_tree(&mut data, decryptor)?;
    debug!(path = %path.display(), "config decrypted");

    let top = data.as_object().ok_or(ConfigError::NotAnObject)?;
    for section in REQUIRED_SECTIONS {
        match top.get(section) {
            Some(Value::Object(_)) => {}
            _ => return Err(ConfigError::MissingSection(section)),
        }
    }

    let mut registry = PluginRegistry::new();
    if let Some(Value::Object(backends)) = top.get("backends") {
        registry.register_section(PluginCategory::Backends, backends, loader)?;
    }

    info!(
        path = %path.display(),
        plugins = registry.len(),
        "configuration loaded"
    );
    Ok(LoadedConfig { data, registry })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
