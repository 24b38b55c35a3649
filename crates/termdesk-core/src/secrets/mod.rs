//! Encrypted-field codec over a parsed JSON tree.
//!
//! Configuration files may carry ciphertext in any string position.  A
//! string value is treated as ciphertext exactly when it begins with the
//! reserved [`SECRET_MARKER`] prefix; the codec strips the marker and
//! replaces the value, in place, with the plaintext obtained from the
//! [`Decrypt`] port.  The walk is total-tree and not key-selective: nested
//! objects and arrays are descended at arbitrary depth and the key a string
//! sits under is irrelevant.
//!
//! # Failure modes
//!
//! A decrypt failure on any single field is not contained locally.  It
//! aborts the whole walk with [`SecretError::Decrypt`], naming the dotted
//! path of the offending field, and the caller must discard the partially
//! transformed tree.  This is deliberate: a config with one undecryptable
//! secret is a config the operator must fix, not one to limp along with.

use serde_json::Value;
use thiserror::Error;

/// Reserved prefix marking a string value as ciphertext.
///
/// Known correctness risk: detection is prefix-based with no escaping
/// mechanism, so a legitimately plaintext string that happens to start
/// with this marker is misinterpreted as ciphertext.  Keep the marker out
/// of ordinary configuration values.
pub const SECRET_MARKER: &str = "<encrypted>";

/// Port abstracting the decryption capability.
///
/// The engine never defines the algorithm; implementations live in the
/// application's infrastructure layer (an OS keyring adapter, an HSM
/// client, or a table-backed mock in tests).
pub trait Decrypt {
    /// Decrypts one ciphertext payload (marker already stripped).
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError>;
}

/// Error produced by a [`Decrypt`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptError {
    /// The payload is not known to the backing key store.
    #[error("ciphertext not known to the decryption backend")]
    UnknownCiphertext,
    /// The backend itself failed (keyring locked, device gone, ...).
    #[error("decryption backend error: {0}")]
    Backend(String),
}

/// Error produced by the tree walk.
#[derive(Debug, Error)]
pub enum SecretError {
    /// A marked field could not be decrypted; the whole load must abort.
    #[error("failed to decrypt field '{path}': {source}")]
    Decrypt {
        /// Dotted path of the offending field, e.g. `$.auth.tokens[2]`.
        path: String,
        #[source]
        source: DecryptError,
    },
}

/// Walks the tree and replaces every marked string with its plaintext.
///
/// # Errors
///
/// Returns [`SecretError::Decrypt`] on the first field the port cannot
/// decrypt.  The tree may be partially transformed at that point and must
/// not be used.
pub fn decrypt_tree(value: &mut Value, decryptor: &dyn Decrypt) -> Result<(), SecretError> {
    walk(value, decryptor, "$")
}

fn walk(value: &mut Value, decryptor: &dyn Decrypt, path: &str) -> Result<(), SecretError> {
    match value {
        Value::String(s) => {
            if let Some(ciphertext) = s.strip_prefix(SECRET_MARKER) {
                let plaintext =
                    decryptor
                        .decrypt(ciphertext)
                        .map_err(|source| SecretError::Decrypt {
                            path: path.to_string(),
                            source,
                        })?;
                *s = plaintext;
            }
        }
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                walk(child, decryptor, &format!("{path}.{key}"))?;
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                walk(child, decryptor, &format!("{path}[{index}]"))?;
            }
        }
        // Numbers, booleans, and null are never ciphertext.
        _ => {}
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
