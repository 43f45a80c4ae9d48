//! The `ext` extension field: binds content-type and body into the MAC input.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// The `ext` field of an Authorization header: a hex sha1 digest, or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ext(String);

impl Ext {
    /// Compute `ext` from a request's content-type and body.
    ///
    /// - both present (non-empty) -> `sha1hex(content_type || body)`
    /// - exactly one present (including an empty-string body/content-type
    ///   that is nonetheless *present*) -> `sha1hex(thatOne)`
    /// - both absent -> `""`
    pub fn compute(content_type: Option<&str>, body: Option<&str>) -> Self {
        match (content_type, body) {
            (Some(ct), Some(b)) => Ext(sha1_hex(&[ct, b].concat())),
            (Some(ct), None) => Ext(sha1_hex(ct)),
            (None, Some(b)) => Ext(sha1_hex(b)),
            (None, None) => Ext(String::new()),
        }
    }

    /// Parse a raw `ext` value as received on the wire (hex digest or empty).
    pub fn from_raw(s: impl Into<String>) -> Self {
        Ext(s.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
