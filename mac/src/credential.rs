//! The credential record persisted by the key store and served by the
//! credential service.

use serde::{Deserialize, Serialize};

use crate::error::{MacError, Result};
use crate::key::MacKey;
use crate::key_id::KeyId;
use crate::normalized::{Mac, MacAlgorithm};

/// Schema tag stamped onto every newly created credential document.
pub const CREDS_TYPE: &str = "creds_v1.0";

/// The scheme-specific half of a credential: exactly one of `hmac`/`basic`.
///
/// Tagged on the wire by `auth_scheme`, with the scheme's own fields
/// flattened alongside the record's common fields (per Design Note
/// "dynamic dispatch over auth scheme" — a single match replaces what the
/// source did with duck-typed dictionaries).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "auth_scheme", rename_all = "snake_case")]
pub enum CredentialScheme {
    /// MAC-based credentials.
    Hmac {
        /// The externally visible identifier; equals the record's `id`.
        mac_key_identifier: KeyId,
        /// Opaque key material.
        mac_key: MacKey,
        /// Which HMAC hash the key is used with.
        mac_algorithm: MacAlgorithm,
    },
    /// Simple API-key credentials.
    Basic {
        /// The externally visible identifier; equals the record's `id`.
        api_key: String,
    },
}

impl CredentialScheme {
    /// Mint a fresh `hmac` scheme with freshly generated key material.
    pub fn generate_hmac() -> Self {
        CredentialScheme::Hmac {
            mac_key_identifier: KeyId::generate(),
            mac_key: MacKey::generate(),
            mac_algorithm: MacAlgorithm::HmacSha1,
        }
    }

    /// Mint a fresh `basic` scheme with a freshly generated API key.
    pub fn generate_basic() -> Self {
        CredentialScheme::Basic {
            api_key: KeyId::generate().to_string(),
        }
    }

    /// The record's externally-visible identifier.
    pub fn id(&self) -> &str {
        match self {
            CredentialScheme::Hmac { mac_key_identifier, .. } => mac_key_identifier.as_str(),
            CredentialScheme::Basic { api_key } => api_key.as_str(),
        }
    }

    /// Recompute and compare the MAC for this credential's scheme.
    ///
    /// `basic` credentials have no MAC to verify; callers that reach a
    /// `basic` record in a MAC-verification context should treat this as
    /// an unsupported-scheme condition, not a mismatch.
    pub fn verify_mac(&self, normalized: &str, supplied: &Mac) -> Result<bool> {
        match self {
            CredentialScheme::Hmac { mac_key, mac_algorithm, .. } => {
                supplied.verify(mac_key, *mac_algorithm, normalized)
            }
            CredentialScheme::Basic { .. } => Err(MacError::InvalidAuthScheme(
                "basic credentials do not support MAC verification".into(),
            )),
        }
    }
}

/// A stored credential document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// The scheme-specific fields (and externally visible identifier).
    #[serde(flatten)]
    pub scheme: CredentialScheme,
    /// Free-form owner/principal identifier. Immutable after creation.
    pub owner: String,
    /// Soft-delete tombstone. Monotonic false -> true.
    #[serde(default)]
    pub is_deleted: bool,
    /// Internal schema tag used by store views to filter documents.
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl CredentialRecord {
    /// Build a brand-new, non-deleted credential record.
    pub fn new(owner: impl Into<String>, scheme: CredentialScheme) -> Self {
        CredentialRecord {
            scheme,
            owner: owner.into(),
            is_deleted: false,
            doc_type: CREDS_TYPE.to_string(),
        }
    }

    /// The record's external identifier (delegates to the scheme).
    pub fn id(&self) -> &str {
        self.scheme.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_matches_scheme_identifier() {
        let record = CredentialRecord::new("dave@example.com", CredentialScheme::generate_hmac());
        match &record.scheme {
            CredentialScheme::Hmac { mac_key_identifier, .. } => {
                assert_eq!(record.id(), mac_key_identifier.as_str());
            }
            _ => panic!("expected hmac scheme"),
        }
    }

    #[test]
    fn new_records_are_not_deleted() {
        let record = CredentialRecord::new("dave@example.com", CredentialScheme::generate_hmac());
        assert!(!record.is_deleted);
        assert_eq!(record.doc_type, CREDS_TYPE);
    }

    #[test]
    fn round_trips_through_json() {
        let record = CredentialRecord::new("dave@example.com", CredentialScheme::generate_hmac());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["auth_scheme"], "hmac");
        assert_eq!(json["owner"], "dave@example.com");
        assert_eq!(json["type"], "creds_v1.0");

        let back: CredentialRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), record.id());
    }

    #[test]
    fn basic_scheme_rejects_mac_verification() {
        let record = CredentialRecord::new("dave@example.com", CredentialScheme::generate_basic());
        let mac = Mac::from_raw("whatever");
        assert!(record.scheme.verify_mac("normalized", &mac).is_err());
    }
}
