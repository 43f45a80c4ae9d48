//! Key identifiers (`mac_key_identifier`).

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MacError, Result};

/// Alphabet used for generated key-ids: url-safe, no padding character.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Fixed length of a generated (and accepted) key identifier.
pub const KEY_ID_LEN: usize = 32;

/// A 32-character, url-safe credential identifier with >=128 bits of entropy.
///
/// For the `hmac` auth scheme this is the `mac_key_identifier`; credential
/// documents also use it as their external `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Mint a fresh, random key-id.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let s: String = (0..KEY_ID_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        KeyId(s)
    }

    /// Parse a key-id, validating length and alphabet.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() != KEY_ID_LEN {
            return Err(MacError::InvalidKeyId(format!(
                "expected {} characters, got {}",
                KEY_ID_LEN,
                s.len()
            )));
        }
        if !s.chars().all(is_urlsafe_char) {
            return Err(MacError::InvalidKeyId(
                "must be url-safe base64 characters".into(),
            ));
        }
        Ok(KeyId(s))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_urlsafe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyId {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self> {
        KeyId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_ids_have_expected_length_and_alphabet() {
        for _ in 0..256 {
            let id = KeyId::generate();
            assert_eq!(id.as_str().len(), KEY_ID_LEN);
            assert!(id.as_str().chars().all(is_urlsafe_char));
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(KeyId::parse("short").is_err());
        assert!(KeyId::parse("a".repeat(33)).is_err());
    }

    #[test]
    fn rejects_invalid_alphabet() {
        let mut s = "a".repeat(31);
        s.push('!');
        assert!(KeyId::parse(s).is_err());
    }
}
