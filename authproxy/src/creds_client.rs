//! Async client to the credential service, used by the VERIFY stage to
//! retrieve the record for an inbound key identifier.

use serde::Deserialize;
use yar_mac::CredentialScheme;

/// The shape of a `GET /v1.0/creds/{id}` response body: a credential
/// record with its storage-internal `type` tag already stripped.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchedCredential {
    /// Scheme-specific fields, tagged by `auth_scheme`.
    #[serde(flatten)]
    pub scheme: CredentialScheme,
    /// Owner/principal identifier.
    pub owner: String,
    /// Soft-delete tombstone.
    #[serde(default)]
    pub is_deleted: bool,
}

/// Thin async wrapper around the credential service's read endpoint.
pub struct CredsServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl CredsServiceClient {
    /// Build a client pointed at `keyserver` (e.g. `http://127.0.0.1:8070`).
    pub fn new(http: reqwest::Client, keyserver_base_url: String) -> Self {
        CredsServiceClient {
            http,
            base_url: keyserver_base_url,
        }
    }

    /// Fetch the live (non-deleted) credential for `key_id`, or `None` if
    /// it doesn't exist, is deleted, or the service call failed. The
    /// pipeline treats all three identically (`CREDS_NOT_FOUND`).
    pub async fn fetch(&self, key_id: &str) -> Option<FetchedCredential> {
        let url = format!("{}/v1.0/creds/{key_id}", self.base_url);
        let response = self.http.get(&url).send().await.ok()?;
        if response.status() != reqwest::StatusCode::OK {
            return None;
        }
        let credential: FetchedCredential = response.json().await.ok()?;
        if credential.is_deleted {
            return None;
        }
        Some(credential)
    }
}
