//! Normalized request string, MAC algorithms, and MAC compute/verify.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac as HmacTrait};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::error::{MacError, Result};
use crate::ext::Ext;
use crate::key::MacKey;
use crate::nonce::Nonce;
use crate::timestamp::Timestamp;

type HmacSha1 = Hmac<Sha1>;

/// The HMAC hash algorithm naming a credential's MAC scheme.
///
/// Only `hmac-sha-1` is implemented today; the enum shape leaves room for a
/// `HmacSha256` variant as a one-line addition without touching callers that
/// match exhaustively through [`CredentialScheme::verify`](crate::credential::CredentialScheme::verify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacAlgorithm {
    /// `hmac-sha-1`
    #[serde(rename = "hmac-sha-1")]
    HmacSha1,
}

impl MacAlgorithm {
    /// The wire name of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            MacAlgorithm::HmacSha1 => "hmac-sha-1",
        }
    }

    /// Parse a wire-format algorithm name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "hmac-sha-1" => Ok(MacAlgorithm::HmacSha1),
            other => Err(MacError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for MacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a request covered by the MAC, in canonical order.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedRequest<'a> {
    /// Request timestamp.
    pub ts: &'a Timestamp,
    /// Request nonce.
    pub nonce: &'a Nonce,
    /// HTTP method, verbatim (no case-folding).
    pub method: &'a str,
    /// Request URI (path + query), verbatim.
    pub uri: &'a str,
    /// Host, as parsed from the `Host` header (or its configured fallback).
    pub host: &'a str,
    /// Port, as parsed from the `Host` header (or its configured fallback).
    pub port: u16,
    /// The `ext` extension value.
    pub ext: &'a Ext,
}

impl<'a> NormalizedRequest<'a> {
    /// Render the canonical, newline-joined normalized request string.
    ///
    /// `ts \n nonce \n METHOD \n request-uri \n host \n port \n ext \n`,
    /// trailing newline included, with no extra whitespace.
    pub fn to_normalized_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            self.ts,
            self.nonce,
            self.method,
            self.uri,
            self.host,
            self.port,
            self.ext.as_str(),
        )
    }
}

impl<'a> fmt::Display for NormalizedRequest<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_normalized_string())
    }
}

/// A computed (or received) message authentication code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mac(String);

impl Mac {
    /// `mac = base64(HMAC_H(mac_key_bytes, normalized_request_string))`.
    pub fn compute(key: &MacKey, algorithm: MacAlgorithm, normalized: &str) -> Result<Self> {
        let key_bytes = key.to_bytes()?;
        let digest = match algorithm {
            MacAlgorithm::HmacSha1 => {
                let mut mac = HmacSha1::new_from_slice(&key_bytes)
                    .map_err(|e| MacError::InvalidKey(e.to_string()))?;
                mac.update(normalized.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(Mac(BASE64.encode(digest)))
    }

    /// Recompute the expected MAC and compare to `self` in constant time.
    pub fn verify(&self, key: &MacKey, algorithm: MacAlgorithm, normalized: &str) -> Result<bool> {
        let expected = Mac::compute(key, algorithm, normalized)?;
        Ok(constant_time_eq(self.0.as_bytes(), expected.0.as_bytes()))
    }

    /// Parse a raw, base64-encoded MAC value as received on the wire.
    pub fn from_raw(s: impl Into<String>) -> Self {
        Mac(s.into())
    }

    /// The base64-encoded MAC text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Constant-time byte comparison; used for MAC verification to avoid
/// leaking timing information about where two MACs first diverge.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_matches_iff_mac_equals_recomputed() {
        let key = MacKey::generate();
        let normalized = "1234\nnonny\nGET\n/v1/api\nhost.example\n443\n\n";
        let mac = Mac::compute(&key, MacAlgorithm::HmacSha1, normalized).unwrap();
        assert!(mac.verify(&key, MacAlgorithm::HmacSha1, normalized).unwrap());

        let tampered = Mac::from_raw("not-the-mac");
        assert!(!tampered
            .verify(&key, MacAlgorithm::HmacSha1, normalized)
            .unwrap());
    }

    #[test]
    fn different_normalized_strings_produce_different_macs() {
        let key = MacKey::generate();
        let a = Mac::compute(&key, MacAlgorithm::HmacSha1, "one\n").unwrap();
        let b = Mac::compute(&key, MacAlgorithm::HmacSha1, "two\n").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn normalized_string_has_canonical_newline_layout() {
        let ts = Timestamp::new(1000);
        let nonce = Nonce::parse("nonny12345678").unwrap();
        let ext = Ext::from_raw("");
        let normalized = NormalizedRequest {
            ts: &ts,
            nonce: &nonce,
            method: "POST",
            uri: "/v1/api",
            host: "mysite.com",
            port: 443,
            ext: &ext,
        };
        assert_eq!(
            normalized.to_normalized_string(),
            "1000\nnonny12345678\nPOST\n/v1/api\nmysite.com\n443\n\n"
        );
    }

    #[test]
    fn constant_time_eq_is_exact() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
