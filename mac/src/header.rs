//! Serialize/parse the `Authorization: MAC ...` header value.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ext::Ext;
use crate::key_id::KeyId;
use crate::nonce::Nonce;
use crate::normalized::Mac;
use crate::timestamp::Timestamp;

/// The five fields carried by a MAC `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    /// `id="..."` — the credential's key identifier.
    pub id: KeyId,
    /// `ts="..."` — request timestamp.
    pub ts: Timestamp,
    /// `nonce="..."` — request nonce.
    pub nonce: Nonce,
    /// `ext="..."` — extension hash, or empty.
    pub ext: Ext,
    /// `mac="..."` — the supplied MAC.
    pub mac: Mac,
}

impl AuthorizationHeader {
    /// Serialize in the canonical field order: `id, ts, nonce, ext, mac`.
    pub fn serialize(&self) -> String {
        format!(
            r#"MAC id="{}", ts="{}", nonce="{}", ext="{}", mac="{}""#,
            self.id, self.ts, self.nonce, self.ext.as_str(), self.mac.as_str(),
        )
    }

    /// Parse a header value. Fields may appear in any order; a missing
    /// scheme, an unparsable grammar, or an empty `id`/`ts`/`nonce`/`mac`
    /// field yields `None` rather than an error — absence and
    /// malformation are collapsed at this layer, per the spec's
    /// `INVALID_AUTH_HEADER` contract. `ext` is the one field an empty
    /// value is legitimate for (§3: no content-type and no body means
    /// `ext == ""`), so it alone is exempt from the empty-rejects rule.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let rest = value.strip_prefix("MAC ")?;

        let mut id = None;
        let mut ts = None;
        let mut nonce = None;
        let mut ext = None;
        let mut mac = None;

        for capture in FIELD_RE.captures_iter(rest) {
            let key = capture.name("key")?.as_str();
            let val = capture.name("value")?.as_str();
            if val.is_empty() && key != "ext" {
                return None;
            }
            match key {
                "id" => id = Some(val.to_string()),
                "ts" => ts = Some(val.to_string()),
                "nonce" => nonce = Some(val.to_string()),
                "ext" => ext = Some(val.to_string()),
                "mac" => mac = Some(val.to_string()),
                _ => return None,
            }
        }

        let id = KeyId::parse(id?).ok()?;
        let ts: Timestamp = ts?.parse().ok()?;
        let nonce = Nonce::parse(nonce?).ok()?;
        let ext = Ext::from_raw(ext?);
        let mac = Mac::from_raw(mac?);

        Some(AuthorizationHeader { id, ts, nonce, ext, mac })
    }
}

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<key>[a-z]+)="(?P<value>[^"]*)""#).expect("static regex is valid")
});
