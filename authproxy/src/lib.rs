//! The yar auth proxy: a reverse proxy that authenticates every inbound
//! request against a MAC `Authorization` header before forwarding it,
//! unchanged, to the protected application service.

#![warn(missing_docs)]

mod config;
mod creds_client;
mod detail;
mod forward;
mod host;
mod pipeline;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use config::{AuthMethod, Cli, Config, LogLevel};
pub use creds_client::{CredsServiceClient, FetchedCredential};
pub use detail::FailureDetail;
pub use pipeline::{authenticate, RequestContext, Verified};
pub use yar_nonce_checker::NonceChecker;

const DETAIL_HEADER: &str = "x-yar-auth-failure-detail";

/// Shared state handed to the proxy's single passthrough handler.
pub struct AppState {
    /// Immutable runtime configuration.
    pub config: Config,
    /// Replay-dedup store, the proxy's only mutable shared state.
    pub nonce_checker: NonceChecker,
    /// Client to the credential service.
    pub creds: CredsServiceClient,
    /// Client used to forward authenticated requests to the app service.
    pub http: reqwest::Client,
}

/// Build the proxy's router: every method and path funnels through
/// [`handle`] via `fallback`, since the proxy's surface is "anything,
/// provided it authenticates" rather than a fixed set of routes.
pub fn app(config: Config) -> Router {
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .expect("reqwest client builds with no custom TLS config");
    let creds = CredsServiceClient::new(http.clone(), config.keyserver_base_url.clone());
    let nonce_checker = NonceChecker::new(config.maxage);

    let state = Arc::new(AppState { config, nonce_checker, creds, http });
    spawn_nonce_sweeper(&state);
    app_with_state(state)
}

/// Build a router over an already-constructed [`AppState`], for tests
/// that stub the credential service and app service with `wiremock`.
pub fn app_with_state(state: Arc<AppState>) -> Router {
    Router::new().fallback(handle).with_state(state).layer(TraceLayer::new_for_http())
}

/// Spawn the nonce checker's periodic eviction sweep on `state`'s maxage
/// as the sweep period, returning the task handle.
pub fn spawn_nonce_sweeper(state: &Arc<AppState>) -> tokio::task::JoinHandle<()> {
    // `yar_nonce_checker::spawn_sweeper` takes ownership of an `Arc`, but
    // the checker lives inline in `AppState` rather than behind its own
    // `Arc`; the sweep loop below mirrors it without a second allocation.
    let state = Arc::clone(state);
    let period = state.config.maxage;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            state.nonce_checker.sweep();
        }
    })
}

/// The proxy's single passthrough handler: runs the pipeline, then either
/// forwards (success) or returns `401` with the failure detail header.
async fn handle(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = RequestContext {
        authorization: headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        method: method.as_str().to_string(),
        uri: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        host_header: headers
            .get(axum::http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        content_type: headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    };

    match pipeline::authenticate(&ctx, &state.config, &state.nonce_checker, &state.creds).await {
        Ok(Verified { owner }) => {
            forward::forward(
                &state.http,
                &state.config.appserver_base_url,
                &ctx.method,
                &ctx.uri,
                headers,
                ctx.body,
                &owner,
            )
            .await
        }
        Err(detail) => {
            warn!(detail = %detail, path = %ctx.uri, "rejected request");
            rejected(detail)
        }
    }
}

fn rejected(detail: FailureDetail) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(DETAIL_HEADER, detail.as_str())],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum_test::TestServer;
    use wiremock::matchers::{method as wm_method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use yar_mac::{AuthorizationHeader, CredentialRecord, CredentialScheme, Ext, KeyId, Mac, MacAlgorithm, MacKey, Nonce, NormalizedRequest, Timestamp};

    async fn test_server(keyserver: &MockServer, appserver_base_url: String) -> TestServer {
        let config = Config {
            lon: "127.0.0.1:0".parse().unwrap(),
            keyserver_base_url: keyserver.uri(),
            appserver_base_url,
            maxage: Duration::from_secs(30),
            host_if_not_found: "localhost".into(),
            port_if_not_found: 80,
            upstream_timeout: Duration::from_secs(5),
        };
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .unwrap();
        let creds = CredsServiceClient::new(http.clone(), config.keyserver_base_url.clone());
        let nonce_checker = NonceChecker::new(config.maxage);
        let state = Arc::new(AppState { config, nonce_checker, creds, http });
        TestServer::new(app_with_state(state)).unwrap()
    }

    fn signed_header(key_id: &KeyId, key: &MacKey, uri: &str, host: &str) -> String {
        let ts = Timestamp::now();
        let nonce = Nonce::generate();
        let ext = Ext::compute(None, None);
        let normalized = NormalizedRequest {
            ts: &ts,
            nonce: &nonce,
            method: "GET",
            uri,
            host,
            port: 80,
            ext: &ext,
        };
        let mac = Mac::compute(key, MacAlgorithm::HmacSha1, &normalized.to_normalized_string()).unwrap();
        AuthorizationHeader { id: key_id.clone(), ts, nonce, ext, mac }.serialize()
    }

    #[tokio::test]
    async fn missing_auth_header_is_rejected_without_contacting_anything() {
        let keyserver = MockServer::start().await;
        let server = test_server(&keyserver, "http://127.0.0.1:1".into()).await;

        let response = server.get("/widgets").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.header(DETAIL_HEADER).to_str().unwrap(),
            "NO_AUTH_HEADER"
        );
    }

    #[tokio::test]
    async fn valid_mac_is_forwarded_with_principal_header() {
        let keyserver = MockServer::start().await;
        let appserver = MockServer::start().await;

        let key_id = KeyId::generate();
        let key = MacKey::generate();
        let record = CredentialRecord::new(
            "dave@example.com",
            CredentialScheme::Hmac {
                mac_key_identifier: key_id.clone(),
                mac_key: key.clone(),
                mac_algorithm: MacAlgorithm::HmacSha1,
            },
        );

        Mock::given(wm_method("GET"))
            .and(path(format!("/v1.0/creds/{key_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&record))
            .mount(&keyserver)
            .await;
        Mock::given(wm_method("GET"))
            .and(path("/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&appserver)
            .await;

        let server = test_server(&keyserver, appserver.uri()).await;
        let header = signed_header(&key_id, &key, "/widgets", "localhost");

        let response = server
            .get("/widgets")
            .add_header("authorization", header.parse::<axum::http::HeaderValue>().unwrap())
            .add_header("host", "localhost")
            .await;
        response.assert_status(StatusCode::OK);
        response.assert_text("hello");
    }

    #[tokio::test]
    async fn unknown_credential_is_rejected() {
        let keyserver = MockServer::start().await;
        let key_id = KeyId::generate();
        let key = MacKey::generate();

        Mock::given(wm_method("GET"))
            .and(path(format!("/v1.0/creds/{key_id}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&keyserver)
            .await;

        let server = test_server(&keyserver, "http://127.0.0.1:1".into()).await;
        let header = signed_header(&key_id, &key, "/widgets", "localhost");

        let response = server
            .get("/widgets")
            .add_header("authorization", header.parse::<axum::http::HeaderValue>().unwrap())
            .add_header("host", "localhost")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.header(DETAIL_HEADER).to_str().unwrap(),
            "CREDS_NOT_FOUND"
        );
    }
}
