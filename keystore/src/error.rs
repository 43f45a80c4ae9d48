//! Error types for the key store gateway.

use thiserror::Error;

/// Result type for key store gateway operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors constructing a gateway or its requests. Transport/decode failures
/// at request time are *not* represented here: per the spec, those surface
/// as `StoreResponse { ok: false, .. }` so a single failed document lookup
/// never aborts a caller's whole request pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The `host:port/db` address string didn't parse.
    #[error("invalid key store address {0:?}: {1}")]
    InvalidAddress(String, &'static str),
}
