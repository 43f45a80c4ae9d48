//! MAC keys (`mac_key`): opaque key material, never derived from a password.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{MacError, Result};

/// Length of a generated mac key's encoded form (32 raw bytes, base64url, no padding).
pub const MAC_KEY_LEN: usize = 43;

/// Upper bound on an accepted (but not necessarily generated) mac key length.
const MAC_KEY_MAX_LEN: usize = 52;

/// Opaque MAC key material, encoded as base64url (no padding) text.
///
/// Constructed values are never derived from a human-chosen password: they
/// are either 32 uniformly random bytes (`generate`) or externally supplied
/// opaque bytes re-encoded the same way.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacKey(String);

impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MacKey").field(&"<redacted>").finish()
    }
}

impl MacKey {
    /// Mint a fresh key: 32 uniformly random bytes, base64url (no padding) encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        MacKey(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Parse an externally-supplied key value.
    ///
    /// Rejects the empty string, anything outside `[A-Za-z0-9_-]`, and
    /// anything longer than 52 characters.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() || s.len() > MAC_KEY_MAX_LEN {
            return Err(MacError::InvalidKey(format!(
                "length must be in [1, {}], got {}",
                MAC_KEY_MAX_LEN,
                s.len()
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(MacError::InvalidKey(
                "must be url-safe base64 characters".into(),
            ));
        }
        Ok(MacKey(s))
    }

    /// The encoded key text, as stored/transmitted.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the underlying opaque key bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|e| MacError::InvalidKey(e.to_string()))
    }
}
