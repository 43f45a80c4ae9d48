//! Integration-level checks spanning header parsing, normalization, and MAC
//! compute/verify together — the path a real request takes.

use yar_mac::{
    AuthorizationHeader, CredentialRecord, CredentialScheme, Ext, Mac, MacAlgorithm,
    NormalizedRequest, Nonce, Timestamp,
};

fn issue_hmac_credential(owner: &str) -> CredentialRecord {
    CredentialRecord::new(owner, CredentialScheme::generate_hmac())
}

#[test]
fn end_to_end_mac_success() {
    let record = issue_hmac_credential("dave@example.com");
    let CredentialScheme::Hmac { mac_key, mac_algorithm, mac_key_identifier } = &record.scheme
    else {
        panic!("expected hmac scheme");
    };

    let ts = Timestamp::now();
    let nonce = Nonce::generate();
    let ext = Ext::compute(None, None);
    let normalized = NormalizedRequest {
        ts: &ts,
        nonce: &nonce,
        method: "GET",
        uri: "/widgets/42",
        host: "api.example.com",
        port: 443,
        ext: &ext,
    }
    .to_normalized_string();

    let mac = Mac::compute(mac_key, *mac_algorithm, &normalized).unwrap();

    let header = AuthorizationHeader {
        id: mac_key_identifier.clone(),
        ts,
        nonce: nonce.clone(),
        ext: ext.clone(),
        mac: mac.clone(),
    };

    let serialized = header.serialize();
    let parsed = AuthorizationHeader::parse(&serialized).expect("header parses");

    // Server-side: rebuild the normalized string from the parsed header and
    // the request's own method/uri/host/port, and recompute.
    let rebuilt = NormalizedRequest {
        ts: &parsed.ts,
        nonce: &parsed.nonce,
        method: "GET",
        uri: "/widgets/42",
        host: "api.example.com",
        port: 443,
        ext: &parsed.ext,
    }
    .to_normalized_string();

    assert!(record
        .scheme
        .verify_mac(&rebuilt, &parsed.mac)
        .expect("hmac scheme verifies"));
}

#[test]
fn tampered_body_changes_ext_and_fails_verification() {
    let record = issue_hmac_credential("dave@example.com");
    let CredentialScheme::Hmac { mac_key, mac_algorithm, .. } = &record.scheme else {
        panic!("expected hmac scheme");
    };

    let ts = Timestamp::now();
    let nonce = Nonce::generate();
    let original_ext = Ext::compute(Some("application/json"), Some(r#"{"n":1}"#));
    let normalized = NormalizedRequest {
        ts: &ts,
        nonce: &nonce,
        method: "POST",
        uri: "/widgets",
        host: "api.example.com",
        port: 443,
        ext: &original_ext,
    }
    .to_normalized_string();
    let mac = Mac::compute(mac_key, *mac_algorithm, &normalized).unwrap();

    // Attacker swaps the body; ext (and therefore the normalized string)
    // changes, so the previously-valid mac no longer verifies.
    let tampered_ext = Ext::compute(Some("application/json"), Some(r#"{"n":999}"#));
    let tampered_normalized = NormalizedRequest {
        ts: &ts,
        nonce: &nonce,
        method: "POST",
        uri: "/widgets",
        host: "api.example.com",
        port: 443,
        ext: &tampered_ext,
    }
    .to_normalized_string();

    assert!(!record
        .scheme
        .verify_mac(&tampered_normalized, &mac)
        .unwrap());
}

#[test]
fn soft_delete_flag_round_trips_through_json() {
    let mut record = issue_hmac_credential("dave@example.com");
    record.is_deleted = true;
    let json = serde_json::to_string(&record).unwrap();
    let back: CredentialRecord = serde_json::from_str(&json).unwrap();
    assert!(back.is_deleted);
    assert_eq!(back.id(), record.id());
}

#[test]
fn malformed_header_values_parse_to_none() {
    let cases = [
        "",
        "MAC",
        "MAC ",
        r#"Basic id="x""#,
        r#"MAC id="", ts="1", nonce="nonceval12", ext="", mac="x""#,
        r#"MAC id="short", ts="1", nonce="nonceval12", ext="", mac="x""#,
        r#"MAC id="aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", ts="notanumber", nonce="nonceval12", ext="", mac="x""#,
    ];
    for case in cases {
        assert!(
            AuthorizationHeader::parse(case).is_none(),
            "expected None for {case:?}"
        );
    }
}
