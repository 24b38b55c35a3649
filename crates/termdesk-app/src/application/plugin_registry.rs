//! Plugin registry: one instantiated plugin per configured name.
//!
//! The registry owns every plugin object for the process.  Storage is flat
//! and keyed by name across the whole registry, not per category, so a
//! name collision across categories silently replaces the earlier
//! registration (last one wins).  Category membership is an explicit tag
//! on each descriptor, set at registration time; listing filters on that
//! tag and never infers anything from naming conventions.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{JsonMap, PluginCategory};
use crate::infrastructure::plugins::{Plugin, PluginError, PluginLoader};

/// One registered plugin: identity, origin, configuration, and the live
/// object.
#[derive(Debug)]
pub struct PluginDescriptor {
    pub name: String,
    pub category: PluginCategory,
    pub options: JsonMap,
    pub instance: Box<dyn Plugin>,
}

/// Registry of all instantiated plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates and stores one plugin per entry of a configuration
    /// section.
    ///
    /// Entries whose options are not an object are skipped with a warning;
    /// they are configuration damage, not a reason to fail the load.  A
    /// loader failure, by contrast, aborts population with the error.
    ///
    /// # Errors
    ///
    /// Propagates [`PluginError::Load`] from the loader.
    pub fn register_section(
        &mut self,
        category: PluginCategory,
        section: &JsonMap,
        loader: &dyn PluginLoader,
    ) -> Result<(), PluginError> {
        for (name, options) in section {
            let options = match options {
                Value::Object(map) => map.clone(),
                _ => {
                    warn!(
                        plugin = %name,
                        category = %category,
                        "plugin options are not an object; skipping entry"
                    );
                    continue;
                }
            };

            let instance = loader.load(category, name, &options)?;
            if self.plugins.contains_key(name) {
                debug!(plugin = %name, "replacing earlier registration with the same name");
            }
            self.plugins.insert(
                name.clone(),
                PluginDescriptor {
                    name: name.clone(),
                    category,
                    options,
                    instance,
                },
            );
        }
        Ok(())
    }

    /// Looks up a plugin by name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] when absent.  The failure is
    /// caller-local; the registry itself stays valid.
    pub fn get_plugin(&self, name: &str) -> Result<&PluginDescriptor, PluginError> {
        self.plugins
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    /// Names of all plugins registered under `category`, sorted.
    pub fn list_plugins(&self, category: PluginCategory) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .plugins
            .values()
            .filter(|descriptor| descriptor.category == category)
            .map(|descriptor| descriptor.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Total number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry holds no plugins.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::plugins::mock::MockPluginLoader;
    use serde_json::json;

    fn section(entries: Value) -> JsonMap {
        entries.as_object().expect("test section is an object").clone()
    }

    #[test]
    fn test_register_section_instantiates_one_plugin_per_name() {
        // Arrange
        let mut registry = PluginRegistry::new();
        let loader = MockPluginLoader::new();

        // Act
        registry
            .register_section(
                PluginCategory::Backends,
                &section(json!({"files": {"enabled": true}, "imap": {}})),
                &loader,
            )
            .expect("registration must succeed");

        // Assert
        assert_eq!(registry.len(), 2);
        assert_eq!(loader.load_count(), 2);
        let files = registry.get_plugin("files").expect("files present");
        assert_eq!(files.category, PluginCategory::Backends);
        assert_eq!(files.options.get("enabled"), Some(&json!(true)));
    }

    #[test]
    fn test_get_plugin_unknown_name_is_not_found() {
        let registry = PluginRegistry::new();

        let result = registry.get_plugin("ghost");

        assert!(matches!(result, Err(PluginError::NotFound(name)) if name == "ghost"));
    }

    #[test]
    fn test_lookup_failure_does_not_invalidate_registry() {
        let mut registry = PluginRegistry::new();
        let loader = MockPluginLoader::new();
        registry
            .register_section(
                PluginCategory::Backends,
                &section(json!({"files": {}})),
                &loader,
            )
            .expect("registration must succeed");

        let _ = registry.get_plugin("ghost");

        assert!(registry.get_plugin("files").is_ok());
    }

    #[test]
    fn test_list_plugins_filters_by_explicit_category_tag() {
        let mut registry = PluginRegistry::new();
        let loader = MockPluginLoader::new();
        registry
            .register_section(
                PluginCategory::Backends,
                &section(json!({"files": {}, "imap": {}})),
                &loader,
            )
            .expect("backends");
        registry
            .register_section(
                PluginCategory::Translators,
                &section(json!({"deepl": {}})),
                &loader,
            )
            .expect("translators");

        assert_eq!(
            registry.list_plugins(PluginCategory::Backends),
            vec!["files", "imap"]
        );
        assert_eq!(
            registry.list_plugins(PluginCategory::Translators),
            vec!["deepl"]
        );
        assert!(registry.list_plugins(PluginCategory::Middleware).is_empty());
    }

    #[test]
    fn test_cross_category_name_collision_overwrites() {
        let mut registry = PluginRegistry::new();
        let loader = MockPluginLoader::new();
        registry
            .register_section(
                PluginCategory::Backends,
                &section(json!({"bridge": {}})),
                &loader,
            )
            .expect("backends");

        registry
            .register_section(
                PluginCategory::Communication,
                &section(json!({"bridge": {}})),
                &loader,
            )
            .expect("communication");

        // Last registration wins; the registry is name-scoped, not
        // category-scoped.
        assert_eq!(registry.len(), 1);
        let bridge = registry.get_plugin("bridge").expect("bridge present");
        assert_eq!(bridge.category, PluginCategory::Communication);
        assert!(registry.list_plugins(PluginCategory::Backends).is_empty());
    }

    #[test]
    fn test_mistyped_options_entry_is_skipped() {
        let mut registry = PluginRegistry::new();
        let loader = MockPluginLoader::new();

        registry
            .register_section(
                PluginCategory::Backends,
                &section(json!({"good": {}, "bad": "not an object"})),
                &loader,
            )
            .expect("registration must succeed");

        assert_eq!(registry.len(), 1);
        assert!(registry.get_plugin("good").is_ok());
        assert!(registry.get_plugin("bad").is_err());
    }

    #[test]
    fn test_loader_failure_aborts_population() {
        let mut registry = PluginRegistry::new();
        let loader = MockPluginLoader::new().fail_on("broken");

        let result = registry.register_section(
            PluginCategory::Backends,
            &section(json!({"broken": {}})),
            &loader,
        );

        assert!(matches!(result, Err(PluginError::Load { name, .. }) if name == "broken"));
    }
}
