//! Thin async client turning logical key-store operations into HTTP calls.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::address::StoreAddress;

/// A logical request against the document database.
///
/// Replaces the source's `args[0][0]`-indexed varargs path builder (Design
/// Note, "ambiguous couchdb helper") with an explicit, exhaustively-matched
/// variant.
#[derive(Debug, Clone)]
pub enum StoreRequest<'a> {
    /// Fetch a single document by id.
    GetById(&'a str),
    /// Write a document at the given id (create or replace).
    PutById(&'a str, Value),
    /// Query an installed view (`_design/{view}/_view/{view}?key="{key}"`).
    ViewByKey { view: &'a str, key: &'a str },
    /// Query an installed view with no key filter, returning every row it
    /// emits (`_design/{view}/_view/{view}`).
    ViewAll { view: &'a str },
}

/// The outcome of a store request.
///
/// `ok` is false whenever the transport failed or the response body could
/// not be parsed as JSON; in that case `code` and `body` carry whatever
/// partial information is available. The caller (the credential service)
/// interprets `code` to decide between `404`/`500`/etc.
#[derive(Debug, Clone)]
pub struct StoreResponse {
    /// Whether a well-formed HTTP response with a JSON body was received.
    pub ok: bool,
    /// The HTTP status code, if a response was received at all.
    pub code: Option<u16>,
    /// The decoded JSON body. For view queries, this is the unwrapped list
    /// of row values (`Value::Array`), matching the document database's
    /// `{"rows": [{"value": doc}, ...]}` view-response shape.
    pub body: Option<Value>,
}

impl StoreResponse {
    fn transport_failure() -> Self {
        StoreResponse { ok: false, code: None, body: None }
    }
}

/// Async wrapper around the document database's document and view HTTP API.
///
/// At most one outstanding call is issued per logical operation invocation;
/// nothing here blocks a shared worker thread (`reqwest` drives requests
/// entirely through non-blocking I/O).
pub struct KeyStoreGateway {
    http: reqwest::Client,
    address: StoreAddress,
}

impl KeyStoreGateway {
    /// Build a gateway pointed at `address`, with the given per-request
    /// timeout.
    pub fn new(address: StoreAddress, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with no custom TLS config");
        KeyStoreGateway { http, address }
    }

    /// Fetch a document by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResponse {
        self.execute(StoreRequest::GetById(id)).await
    }

    /// Write a document at `id`.
    pub async fn put_by_id(&self, id: &str, doc: Value) -> StoreResponse {
        self.execute(StoreRequest::PutById(id, doc)).await
    }

    /// Query an installed view for documents keyed on `key`.
    pub async fn view_by_key(&self, view: &str, key: &str) -> StoreResponse {
        self.execute(StoreRequest::ViewByKey { view, key }).await
    }

    /// Query an installed view for every document it emits, unfiltered.
    pub async fn view_all(&self, view: &str) -> StoreResponse {
        self.execute(StoreRequest::ViewAll { view }).await
    }

    /// Issue a single logical request against the store.
    pub async fn execute(&self, request: StoreRequest<'_>) -> StoreResponse {
        let url = match &request {
            StoreRequest::GetById(id) | StoreRequest::PutById(id, _) => {
                format!("{}/{}", self.address.base_url(), id)
            }
            StoreRequest::ViewByKey { view, key } => format!(
                r#"{}/_design/{view}/_view/{view}?key="{key}""#,
                self.address.base_url(),
            ),
            StoreRequest::ViewAll { view } => {
                format!("{}/_design/{view}/_view/{view}", self.address.base_url())
            }
        };

        let builder = match &request {
            StoreRequest::GetById(_) | StoreRequest::ViewByKey { .. } | StoreRequest::ViewAll { .. } => {
                self.http.get(&url)
            }
            StoreRequest::PutById(_, doc) => self.http.put(&url).json(doc),
        };

        let builder = builder
            .header("Content-Type", "application/json; charset=utf8")
            .header("Accept", "application/json");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%url, error = %err, "key store request failed in transport");
                return StoreResponse::transport_failure();
            }
        };

        let code = response.status().as_u16();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%url, error = %err, "key store response body read failed");
                return StoreResponse { ok: false, code: Some(code), body: None };
            }
        };

        if bytes.is_empty() {
            return StoreResponse { ok: true, code: Some(code), body: None };
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => StoreResponse {
                ok: true,
                code: Some(code),
                body: Some(unwrap_rows(body)),
            },
            Err(err) => {
                warn!(%url, error = %err, "key store response body was not valid JSON");
                StoreResponse { ok: false, code: Some(code), body: None }
            }
        }
    }
}

/// If `body` is a CouchDB-style view response (`{"rows": [...]}`), unwrap
/// each row's `value` into a flat array, matching `couchdb.py`'s `_fetch`.
/// Any other JSON body passes through unchanged.
fn unwrap_rows(body: Value) -> Value {
    let Some(rows) = body.get("rows").and_then(Value::as_array) else {
        return body;
    };
    let docs: Vec<Value> = rows
        .iter()
        .map(|row| row.get("value").cloned().unwrap_or(Value::Null))
        .collect();
    Value::Array(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn gateway_for(server: &MockServer, db: &str) -> KeyStoreGateway {
        let url = server.uri();
        let url = url.trim_start_matches("http://");
        let address: StoreAddress = format!("{url}/{db}").parse().unwrap();
        KeyStoreGateway::new(address, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn get_by_id_decodes_plain_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/macaa/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "owner": "dave@example.com"
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, "macaa").await;
        let response = gateway.get_by_id("abc123").await;
        assert!(response.ok);
        assert_eq!(response.code, Some(200));
        assert_eq!(response.body.unwrap()["owner"], "dave@example.com");
    }

    #[tokio::test]
    async fn view_by_key_unwraps_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/macaa/_design/by_principal/_view/by_principal"))
            .and(query_param("key", "\"dave@example.com\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rows": [
                    {"id": "abc123", "key": "dave@example.com", "value": {"owner": "dave@example.com"}}
                ]
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, "macaa").await;
        let response = gateway.view_by_key("by_principal", "dave@example.com").await;
        assert!(response.ok);
        let body = response.body.unwrap();
        let docs = body.as_array().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["owner"], "dave@example.com");
    }

    #[tokio::test]
    async fn not_found_is_still_ok_with_the_code_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/macaa/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "not_found"
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, "macaa").await;
        let response = gateway.get_by_id("missing").await;
        assert!(response.ok);
        assert_eq!(response.code, Some(404));
    }

    #[tokio::test]
    async fn transport_failure_is_not_ok() {
        // Nothing listens on this port.
        let address: StoreAddress = "127.0.0.1:1/macaa".parse().unwrap();
        let gateway = KeyStoreGateway::new(address, Duration::from_millis(200));
        let response = gateway.get_by_id("abc123").await;
        assert!(!response.ok);
        assert_eq!(response.code, None);
    }
}
