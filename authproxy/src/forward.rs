//! Stage 7 (`FORWARD`): relay an authenticated request to the
//! application service and stream its response back unchanged, plus the
//! `X-Yar-Principal` header added on success.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;

/// Response headers that describe the hop to the application service
/// itself rather than its payload; these are never copied onto the
/// response the proxy hands back to its own client.
const HOP_BY_HOP: &[&str] = &["connection", "transfer-encoding", "upgrade"];

/// The header carrying the authenticated principal, added to the
/// outbound request on a successful `VERIFY`.
pub const PRINCIPAL_HEADER: &str = "x-yar-principal";

/// Forward `method`/`uri`/`headers`/`body` to `appserver_base_url`
/// verbatim, with `X-Yar-Principal: {owner}` added, and stream the
/// response back without buffering it in memory.
pub async fn forward(
    http: &reqwest::Client,
    appserver_base_url: &str,
    method: &str,
    uri: &str,
    mut headers: HeaderMap,
    body: Vec<u8>,
    owner: &str,
) -> Response {
    let url = format!("{appserver_base_url}{uri}");

    let method = match reqwest::Method::from_bytes(method.as_bytes()) {
        Ok(method) => method,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    if let Ok(value) = HeaderValue::from_str(owner) {
        headers.insert(HeaderName::from_static("x-yar-principal"), value);
    }
    strip_hop_by_hop(&mut headers);

    let upstream = http
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await;

    let upstream = match upstream {
        Ok(response) => response,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    response
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}
