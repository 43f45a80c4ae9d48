//! The auth proxy's request-verification pipeline:
//! `PARSE -> FRESHNESS -> NONCE -> CREDS -> VERIFY`, terminating in
//! `FORWARDED` (success) or `REJECTED(detail)` (`spec.md` §4.5).
//!
//! Per Design Note "cyclic wiring of async stages", this is a linear
//! pipeline of typestate structs rather than a handler threaded through
//! nested callbacks: each stage consumes the previous stage's state and
//! returns either the next stage or a terminal [`FailureDetail`]. A later
//! stage's future is never constructed until the prior one has already
//! resolved, so cancellation (a client disconnect) simply drops the
//! in-flight stage's future — there is nothing else to unwind.

use yar_mac::{AuthorizationHeader, CredentialScheme, Ext, MacAlgorithm, NormalizedRequest, Timestamp};
use yar_nonce_checker::NonceChecker;

use crate::config::Config;
use crate::creds_client::{CredsServiceClient, FetchedCredential};
use crate::detail::FailureDetail;

/// Everything the pipeline needs to know about one inbound request.
/// Built once by the HTTP layer from the `axum` request parts and handed
/// to [`authenticate`] by reference.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The raw `Authorization` header value, if present.
    pub authorization: Option<String>,
    /// HTTP method, verbatim.
    pub method: String,
    /// Request URI (path + query), verbatim.
    pub uri: String,
    /// The raw `Host` header value, if present.
    pub host_header: Option<String>,
    /// The raw `Content-Type` header value, if present.
    pub content_type: Option<String>,
    /// The request body bytes.
    pub body: Vec<u8>,
}

/// The pipeline's terminal success state: the request is authenticated
/// and may be forwarded. `owner` becomes the outbound `X-Yar-Principal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    /// The credential's owner/principal.
    pub owner: String,
}

/// Stage 1 (`PARSE`): read and parse the `Authorization` header.
fn parse(ctx: &RequestContext) -> Result<AuthorizationHeader, FailureDetail> {
    let raw = ctx.authorization.as_deref().ok_or(FailureDetail::NoAuthHeader)?;
    AuthorizationHeader::parse(raw).ok_or(FailureDetail::InvalidAuthHeader)
}

/// Stage 2 (`FRESHNESS`): `ts` must be within `maxage` seconds of now,
/// on either side (spec §9 open question (c): symmetric window).
fn check_freshness(header: &AuthorizationHeader, config: &Config) -> Result<(), FailureDetail> {
    let now = Timestamp::now();
    if header.ts.is_before(&now) {
        if now.abs_diff(&header.ts) > config.maxage.as_secs() {
            return Err(FailureDetail::TsOld);
        }
    } else if header.ts.abs_diff(&now) > config.maxage.as_secs() {
        return Err(FailureDetail::TsInFuture);
    }
    Ok(())
}

/// Stage 3 (`NONCE`): consult the nonce checker for replay.
fn check_nonce(header: &AuthorizationHeader, nonce_checker: &NonceChecker) -> Result<(), FailureDetail> {
    let fresh = nonce_checker.check_and_insert(
        header.id.as_str(),
        &header.ts.to_string(),
        header.nonce.as_str(),
    );
    if fresh {
        Ok(())
    } else {
        Err(FailureDetail::NonceReused)
    }
}

/// Stage 4 (`CREDS`): fetch the identified credential from the
/// credential service. A missing, deleted, or unreachable record are all
/// `CREDS_NOT_FOUND` — the proxy never distinguishes them to the client.
async fn fetch_credential(
    header: &AuthorizationHeader,
    creds: &CredsServiceClient,
) -> Result<FetchedCredential, FailureDetail> {
    creds
        .fetch(header.id.as_str())
        .await
        .ok_or(FailureDetail::CredsNotFound)
}

/// Stage 5+6 (`VERIFY`): recompute the normalized request string and
/// compare MACs in constant time.
fn verify_mac(
    header: &AuthorizationHeader,
    credential: &FetchedCredential,
    ctx: &RequestContext,
    config: &Config,
) -> Result<(), FailureDetail> {
    let (mac_key, algorithm) = match &credential.scheme {
        CredentialScheme::Hmac { mac_key, mac_algorithm, .. } => (mac_key, *mac_algorithm),
        CredentialScheme::Basic { .. } => return Err(FailureDetail::AuthSchemeUnsupported),
    };

    let (host, port) = crate::host::parse_host_header(
        ctx.host_header.as_deref(),
        &config.host_if_not_found,
        config.port_if_not_found,
    );

    // `axum` hands us an empty byte vector for both "no body at all" and
    // "an explicitly empty body" — the two are indistinguishable once the
    // request has been read, so an empty body is treated as absent here
    // (matching `Ext::compute`'s `None` case rather than its
    // present-but-empty `Some("")` case).
    let body = if ctx.body.is_empty() {
        None
    } else {
        std::str::from_utf8(&ctx.body).ok()
    };
    let ext = Ext::compute(ctx.content_type.as_deref(), body);

    let normalized = NormalizedRequest {
        ts: &header.ts,
        nonce: &header.nonce,
        method: &ctx.method,
        uri: &ctx.uri,
        host: &host,
        port,
        ext: &ext,
    };
    let normalized_string = normalized.to_normalized_string();

    let matches = header
        .mac
        .verify(mac_key, algorithm, &normalized_string)
        .map_err(|_| FailureDetail::MacsDoNotMatch)?;

    if matches {
        Ok(())
    } else {
        Err(FailureDetail::MacsDoNotMatch)
    }
}

/// Run the full pipeline over `ctx`, returning the authenticated
/// principal on success or the detail code to report on failure.
///
/// Stages run strictly in order: a later stage's future is not even
/// constructed until the previous one returns `Ok`, so the `?`-chain
/// below *is* the state machine of `spec.md` §4.5.
pub async fn authenticate(
    ctx: &RequestContext,
    config: &Config,
    nonce_checker: &NonceChecker,
    creds: &CredsServiceClient,
) -> Result<Verified, FailureDetail> {
    let header = parse(ctx)?;
    check_freshness(&header, config)?;
    check_nonce(&header, nonce_checker)?;
    let credential = fetch_credential(&header, creds).await?;
    verify_mac(&header, &credential, ctx, config)?;
    Ok(Verified { owner: credential.owner })
}
