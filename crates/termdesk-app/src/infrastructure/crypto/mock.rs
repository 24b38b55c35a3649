//! Table-backed decryptor for unit testing.

use std::collections::HashMap;

use termdesk_core::secrets::{Decrypt, DecryptError};

/// A mock implementation of [`Decrypt`] mapping known ciphertexts to fixed
/// plaintexts; anything else yields [`DecryptError::UnknownCiphertext`].
#[derive(Debug, Default)]
pub struct MockDecryptor {
    entries: HashMap<String, String>,
}

impl MockDecryptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one ciphertext → plaintext pair.
    pub fn with_entry(mut self, ciphertext: &str, plaintext: &str) -> Self {
        self.entries
            .insert(ciphertext.to_string(), plaintext.to_string());
        self
    }
}

impl Decrypt for MockDecryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        self.entries
            .get(ciphertext)
            .cloned()
            .ok_or(DecryptError::UnknownCiphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_decryptor_maps_known_entries() {
        let decryptor = MockDecryptor::new().with_entry("ABC123", "secret");

        assert_eq!(decryptor.decrypt("ABC123").unwrap(), "secret");
        assert!(matches!(
            decryptor.decrypt("nope"),
            Err(DecryptError::UnknownCiphertext)
        ));
    }
}
