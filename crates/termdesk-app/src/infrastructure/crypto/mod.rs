//! Decryption adapters for the encrypted-field codec.
//!
//! The [`Decrypt`](termdesk_core::secrets::Decrypt) port is defined next
//! to the codec in `termdesk-core`; this module holds the application-side
//! implementations.  The real adapter (OS keyring, HSM, ...) belongs to
//! the embedding application; what lives here is the safe default and the
//! table-backed mock for tests.

use termdesk_core::secrets::{Decrypt, DecryptError};

pub mod mock;

/// Decryptor used when no decryption backend is configured.
///
/// Fails on every ciphertext, which makes a configuration carrying
/// encrypted fields a hard load error instead of silently passing
/// ciphertext around as if it were plaintext.
#[derive(Debug, Default)]
pub struct NullDecryptor;

impl Decrypt for NullDecryptor {
    fn decrypt(&self, _ciphertext: &str) -> Result<String, DecryptError> {
        Err(DecryptError::Backend(
            "no decryption backend configured".to_string(),
        ))
    }
}
