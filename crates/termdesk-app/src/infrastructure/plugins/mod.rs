//! Plugin loading port.
//!
//! The engine only defines a plugin's discovery, instantiation, and
//! registry contract; what a plugin does internally is its own business.
//! The [`PluginLoader`] port turns one `(category, name, options)` triple
//! from the configuration into one live [`Plugin`] object.  Real loaders
//! (dynamic libraries, subprocesses, built-in factories) live with the
//! embedding application; tests use [`mock::MockPluginLoader`].

use std::fmt;

use thiserror::Error;

use crate::domain::{JsonMap, PluginCategory};

pub mod mock;

/// An instantiated plugin held by the registry.
pub trait Plugin: fmt::Debug {
    /// The name this plugin was registered under.
    fn name(&self) -> &str;
}

/// Error type for plugin loading and lookup.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Lookup failure; caller-local, the registry stays valid.
    #[error("plugin '{0}' not found")]
    NotFound(String),

    /// A declared plugin could not be instantiated; aborts registry
    /// population.
    #[error("failed to load plugin '{name}' in category '{category}': {reason}")]
    Load {
        name: String,
        category: PluginCategory,
        reason: String,
    },
}

/// Port that instantiates one plugin per declared configuration entry.
pub trait PluginLoader {
    /// Produces a live plugin for `(category, name, options)`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Load`] when the plugin cannot be
    /// instantiated.
    fn load(
        &self,
        category: PluginCategory,
        name: &str,
        options: &JsonMap,
    ) -> Result<Box<dyn Plugin>, PluginError>;
}
