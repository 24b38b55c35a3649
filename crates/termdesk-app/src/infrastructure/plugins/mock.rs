//! Mock plugin loader for unit testing.
//!
//! Allows tests to populate a registry without any real plugin machinery,
//! and to script load failures for specific names.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::{JsonMap, PluginCategory};

use super::{Plugin, PluginError, PluginLoader};

/// Inert plugin produced by the mock loader.
#[derive(Debug)]
pub struct StubPlugin {
    name: String,
}

impl Plugin for StubPlugin {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A mock implementation of [`PluginLoader`].
#[derive(Debug, Default)]
pub struct MockPluginLoader {
    fail_names: HashSet<String>,
    load_count: Mutex<u32>,
}

impl MockPluginLoader {
    /// Creates a loader that succeeds for every name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a load failure for `name`.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.fail_names.insert(name.to_string());
        self
    }

    /// Number of successful loads performed so far.
    pub fn load_count(&self) -> u32 {
        *self.load_count.lock().expect("lock poisoned")
    }
}

impl PluginLoader for MockPluginLoader {
    fn load(
        &self,
        category: PluginCategory,
        name: &str,
        _options: &JsonMap,
    ) -> Result<Box<dyn Plugin>, PluginError> {
        if self.fail_names.contains(name) {
            return Err(PluginError::Load {
                name: name.to_string(),
                category,
                reason: "scripted mock failure".to_string(),
            });
        }
        *self.load_count.lock().expect("lock poisoned") += 1;
        Ok(Box::new(StubPlugin {
            name: name.to_string(),
        }))
    }
}
