//! Country reference catalog.
//!
//! Loaded from a JSON array of free-form objects (name, code, dial code,
//! flag emoji, ...) used by registration and profile UIs.  The engine never
//! interprets the rows; they are passed through unmodified.  Non-critical:
//! a missing or unparseable file yields an empty catalog.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

/// Read-only pass-through list of country rows.
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    rows: Vec<Value>,
}

impl CountryCatalog {
    /// Loads the catalog from a JSON array file; never fails.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "country catalog not readable; starting empty"
                );
                return Self::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(rows)) => Self { rows },
            Ok(_) => {
                warn!(
                    path = %path.display(),
                    "country catalog is not a JSON array; starting empty"
                );
                Self::default()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "country catalog failed to parse; starting empty"
                );
                Self::default()
            }
        }
    }

    /// All rows, in file order.
    pub fn all(&self) -> &[Value] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the catalog holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
