//! # yar-mac
//!
//! MAC request-authentication primitives shared by the `yar` auth proxy and
//! key service: value types that enforce their own well-formedness, a
//! normalized-request-string builder, and MAC compute/verify.
//!
//! Construction failures return `Err(MacError)`. Header *parsing* instead
//! collapses any malformed or missing field into `None` — a client's broken
//! `Authorization` header is an absent value, not a propagated error.

#![warn(missing_docs)]

mod credential;
mod error;
mod ext;
mod header;
mod key;
mod key_id;
mod nonce;
mod normalized;
mod timestamp;

pub use credential::{CredentialRecord, CredentialScheme, CREDS_TYPE};
pub use error::{MacError, Result};
pub use ext::Ext;
pub use header::AuthorizationHeader;
pub use key::{MacKey, MAC_KEY_LEN};
pub use key_id::{KeyId, KEY_ID_LEN};
pub use nonce::{Nonce, NONCE_LEN, NONCE_MIN_LEN};
pub use normalized::{Mac, MacAlgorithm, NormalizedRequest};
pub use timestamp::Timestamp;
