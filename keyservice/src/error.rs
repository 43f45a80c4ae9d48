//! Errors surfaced by the credential service's HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Result type for credential service handlers.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors the credential service's handlers can return. Each variant maps
/// to a fixed HTTP status; internal causes are logged but never echoed to
/// the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// `Content-Type` was missing or did not match
    /// `application/json; charset=utf-?8`.
    #[error("unsupported content type")]
    BadContentType,

    /// The request body did not parse as JSON.
    #[error("request body is not valid JSON")]
    MalformedJson,

    /// The request body failed schema validation.
    #[error("schema validation failed: {0}")]
    RequestSchemaValidation(String),

    /// A response the service built failed schema validation. This is an
    /// internal bug, not a caller error.
    #[error("internal response failed schema validation: {0}")]
    ResponseSchemaValidation(String),

    /// No live credential matches the requested id/owner.
    #[error("credential not found")]
    NotFound,

    /// The key store returned a transport failure or non-2xx status for a
    /// request that should have succeeded.
    #[error("credential store request failed")]
    StoreFailure,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::BadContentType
            | ServiceError::MalformedJson
            | ServiceError::RequestSchemaValidation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::StoreFailure | ServiceError::ResponseSchemaValidation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("error"),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
