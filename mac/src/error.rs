//! Error types for the MAC primitives.

use thiserror::Error;

/// Result type for MAC primitive operations.
pub type Result<T> = std::result::Result<T, MacError>;

/// Errors that can occur while constructing or evaluating a MAC value type.
///
/// Construction failures are distinct from parse failures: a constructor
/// returns `Err(MacError)` for a caller that built a value programmatically,
/// while header parsing (`AuthorizationHeader::parse`) swallows the same
/// failures into `None` per the spec's "absent, not malformed" contract.
#[derive(Debug, Error)]
pub enum MacError {
    /// A key identifier did not match the expected length/alphabet.
    #[error("invalid key identifier: {0}")]
    InvalidKeyId(String),

    /// A MAC key did not match the expected length/alphabet, or failed to
    /// decode as base64url.
    #[error("invalid mac key: {0}")]
    InvalidKey(String),

    /// A nonce did not match the expected length/alphabet.
    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    /// A timestamp string was not a non-negative decimal integer.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The named MAC algorithm is not one this build supports.
    #[error("unsupported mac algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The named auth scheme is not `hmac` or `basic`.
    #[error("invalid auth scheme: {0}")]
    InvalidAuthScheme(String),
}
