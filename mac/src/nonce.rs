//! Per-request nonce values.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MacError, Result};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated nonce.
pub const NONCE_LEN: usize = 16;
/// Shortest nonce accepted on parse (interop with older clients).
pub const NONCE_MIN_LEN: usize = 8;

/// A per-request random token, lowercase alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(String);

impl Nonce {
    /// Mint a fresh 16-character nonce.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let s: String = (0..NONCE_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Nonce(s)
    }

    /// Parse a nonce, accepting lengths in `[NONCE_MIN_LEN, NONCE_LEN]`.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() < NONCE_MIN_LEN || s.len() > NONCE_LEN {
            return Err(MacError::InvalidNonce(format!(
                "length must be in [{}, {}], got {}",
                NONCE_MIN_LEN,
                NONCE_LEN,
                s.len()
            )));
        }
        if !s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(MacError::InvalidNonce(
                "must be lowercase alphanumeric".into(),
            ));
        }
        Ok(Nonce(s))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_nonces_are_well_formed() {
        for _ in 0..1024 {
            let nonce = Nonce::generate();
            assert!(nonce.as_str().len() >= NONCE_MIN_LEN);
            assert!(nonce.as_str().len() <= NONCE_LEN);
            assert!(nonce
                .as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn parse_rejects_too_short() {
        assert!(Nonce::parse("short").is_err());
    }

    #[test]
    fn parse_rejects_too_long() {
        assert!(Nonce::parse("a".repeat(17)).is_err());
    }

    #[test]
    fn parse_rejects_uppercase() {
        assert!(Nonce::parse("ABCDEFGH").is_err());
    }

    #[test]
    fn parse_accepts_min_length() {
        assert!(Nonce::parse("abcdefg1").is_ok());
    }
}
