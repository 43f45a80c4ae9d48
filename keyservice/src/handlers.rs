//! HTTP handlers for the `/v1.0/creds` collection and member resources.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use yar_keystore::KeyStoreGateway;
use yar_mac::{CredentialRecord, CredentialScheme};

use crate::error::{Result, ServiceError};
use crate::schema;

const VIEW_BY_IDENTIFIER: &str = "by_identifier";
const VIEW_BY_PRINCIPAL: &str = "by_principal";

/// Shared state handed to every handler.
pub struct AppState {
    /// Async client to the document database.
    pub store: KeyStoreGateway,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    owner: String,
    #[serde(default)]
    auth_scheme: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GetQuery {
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    owner: Option<String>,
}

fn content_type_is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let value = value.to_ascii_lowercase();
    let mut parts = value.split(';').map(str::trim);
    match parts.next() {
        Some("application/json") => {}
        _ => return false,
    }
    for part in parts {
        if let Some(charset) = part.strip_prefix("charset=") {
            return charset == "utf-8" || charset == "utf8";
        }
    }
    false
}

/// Model fields a credential document is allowed to carry across the HTTP
/// boundary. Everything else — the schema `type` tag, and whatever the
/// store itself injects (`_id`, `_rev`, ...) — is storage-internal.
const MODEL_PROPERTIES: &[&str] = &[
    "owner",
    "is_deleted",
    "auth_scheme",
    "mac_key_identifier",
    "mac_key",
    "mac_algorithm",
    "api_key",
];

/// Project a stored document down to its model fields before it crosses
/// the HTTP boundary.
///
/// A blacklist that only drops `type` leaks whatever else the store
/// injects (CouchDB's `_id`/`_rev`, carried straight through a view's
/// `emit(doc._id, doc)` value) straight into a response whose schema sets
/// `additionalProperties: false` — every real GET/list would then fail
/// schema validation. Whitelisting the model's own fields, per
/// `ks_util.py::_filter_out_non_model_creds_properties`, strips store
/// internals regardless of what they're named.
fn project(doc: Value) -> Value {
    let Some(obj) = doc.as_object() else {
        return doc;
    };
    let mut projected = serde_json::Map::new();
    for key in MODEL_PROPERTIES {
        if let Some(value) = obj.get(*key) {
            projected.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}

fn is_deleted(doc: &Value) -> bool {
    doc.get("is_deleted").and_then(Value::as_bool).unwrap_or(false)
}

/// `POST /v1.0/creds`
pub async fn create_credential(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    if !content_type_is_json(&headers) {
        return Err(ServiceError::BadContentType);
    }

    let instance: Value =
        serde_json::from_slice(&body).map_err(|_| ServiceError::MalformedJson)?;
    schema::validate(&schema::CREATE_REQUEST, &instance)
        .map_err(ServiceError::RequestSchemaValidation)?;

    let request: CreateRequest =
        serde_json::from_value(instance).map_err(|_| ServiceError::MalformedJson)?;

    let scheme = match request.auth_scheme.as_deref().unwrap_or("hmac") {
        "basic" => CredentialScheme::generate_basic(),
        _ => CredentialScheme::generate_hmac(),
    };
    let record = CredentialRecord::new(&request.owner, scheme);
    let id = record.id().to_string();

    let doc = serde_json::to_value(&record).expect("credential record serializes");
    let response = state.store.put_by_id(&id, doc).await;
    if !response.ok || !matches!(response.code, Some(code) if (200..300).contains(&code)) {
        warn!(id, code = ?response.code, "key store rejected credential write");
        return Err(ServiceError::StoreFailure);
    }

    let mut body = project(serde_json::to_value(&record).expect("credential record serializes"));
    body.as_object_mut()
        .expect("credential serializes to an object")
        .insert("id".to_string(), json!(id));
    schema::validate(&schema::CREATE_RESPONSE, &body)
        .map_err(ServiceError::ResponseSchemaValidation)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1.0/creds/{id}"))],
        Json(body),
    )
        .into_response())
}

/// `GET /v1.0/creds/{id}`
pub async fn get_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Response> {
    let response = state.store.get_by_id(&id).await;
    let doc = fetch_live_or_tombstoned(&response)?;

    if is_deleted(doc) && !query.deleted {
        return Err(ServiceError::NotFound);
    }

    let body = project(doc.clone());
    schema::validate(&schema::CREDENTIAL, &body).map_err(ServiceError::ResponseSchemaValidation)?;
    Ok(Json(body).into_response())
}

/// `GET /v1.0/creds?owner={owner}`
pub async fn list_credentials(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let response = match &query.owner {
        Some(owner) => state.store.view_by_key(VIEW_BY_PRINCIPAL, owner).await,
        None => state.store.view_all(VIEW_BY_PRINCIPAL).await,
    };

    if !response.ok || response.code != Some(200) {
        warn!(code = ?response.code, "key store view query failed");
        return Err(ServiceError::StoreFailure);
    }

    let rows = response
        .body
        .as_ref()
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let creds: Vec<Value> = rows
        .into_iter()
        .filter(|doc| !is_deleted(doc))
        .map(project)
        .collect();

    let body = json!({ "creds": creds });
    schema::validate(&schema::LIST_RESPONSE, &body)
        .map_err(ServiceError::ResponseSchemaValidation)?;
    Ok(Json(body).into_response())
}

/// `DELETE /v1.0/creds/{id}`
pub async fn delete_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let response = state.store.get_by_id(&id).await;
    let doc = fetch_live_or_tombstoned(&response)?;

    if is_deleted(doc) {
        return Ok(StatusCode::OK.into_response());
    }

    let mut doc = doc.clone();
    doc.as_object_mut()
        .expect("stored credential is a JSON object")
        .insert("is_deleted".to_string(), json!(true));

    let write = state.store.put_by_id(&id, doc).await;
    if !write.ok || !matches!(write.code, Some(code) if (200..300).contains(&code)) {
        warn!(id, code = ?write.code, "key store rejected soft-delete write");
        return Err(ServiceError::StoreFailure);
    }

    Ok(StatusCode::OK.into_response())
}

/// Look up a document by id, mapping a `404` from the store into
/// [`ServiceError::NotFound`] and any other non-2xx/non-404 outcome into
/// [`ServiceError::StoreFailure`]. Note this does *not* check `is_deleted`
/// — callers decide whether a tombstone counts as found.
fn fetch_live_or_tombstoned(response: &yar_keystore::StoreResponse) -> Result<&Value> {
    match response.code {
        Some(404) => Err(ServiceError::NotFound),
        Some(code) if (200..300).contains(&code) => {
            response.body.as_ref().ok_or(ServiceError::NotFound)
        }
        _ => Err(ServiceError::StoreFailure),
    }
}
