//! Stable failure-detail codes carried on `X-Yar-Auth-Failure-Detail`.

use std::fmt;

/// Why a request was rejected by the auth proxy's pipeline.
///
/// Each variant is a terminal `REJECTED` state of the pipeline's state
/// machine (`spec.md` §4.5); the set is closed and every value is stable
/// wire text, not a `Debug`-derived name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDetail {
    /// `Authorization` header missing.
    NoAuthHeader,
    /// Header present but unparsable, or a field was empty.
    InvalidAuthHeader,
    /// `now - ts > maxage` and `ts` is in the past.
    TsOld,
    /// `ts - now > maxage`.
    TsInFuture,
    /// The nonce checker rejected this `(key-id, ts, nonce)` triple.
    NonceReused,
    /// The key service returned no active record for the identifier.
    CredsNotFound,
    /// The recomputed MAC did not match the supplied one.
    MacsDoNotMatch,
    /// The credential's `auth_scheme` has no MAC-verification path.
    ///
    /// Additive beyond `spec.md`'s listed codes: `basic` credentials are
    /// creatable and retrievable through the credential service, but this
    /// pipeline only verifies `hmac`. A `basic` credential reaching VERIFY
    /// is rejected here rather than silently mismatched.
    AuthSchemeUnsupported,
}

impl FailureDetail {
    /// The exact wire text sent in `X-Yar-Auth-Failure-Detail`.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureDetail::NoAuthHeader => "NO_AUTH_HEADER",
            FailureDetail::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            FailureDetail::TsOld => "TS_OLD",
            FailureDetail::TsInFuture => "TS_IN_FUTURE",
            FailureDetail::NonceReused => "NONCE_REUSED",
            FailureDetail::CredsNotFound => "CREDS_NOT_FOUND",
            FailureDetail::MacsDoNotMatch => "MACS_DO_NOT_MATCH",
            FailureDetail::AuthSchemeUnsupported => "AUTH_SCHEME_UNSUPPORTED",
        }
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
