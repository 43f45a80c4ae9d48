//! Compiled JSON schemas for the credential service's request/response
//! bodies, shipped alongside the binary under `schemas/`.

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::Value;

fn compile(source: &str) -> JSONSchema {
    let schema: Value = serde_json::from_str(source).expect("bundled schema is valid JSON");
    JSONSchema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .compile(&schema)
        .expect("bundled schema compiles")
}

/// Schema for `POST /v1.0/creds` request bodies.
pub static CREATE_REQUEST: Lazy<JSONSchema> =
    Lazy::new(|| compile(include_str!("../schemas/create_request.schema.json")));

/// Schema for `POST /v1.0/creds` response bodies.
pub static CREATE_RESPONSE: Lazy<JSONSchema> =
    Lazy::new(|| compile(include_str!("../schemas/create_response.schema.json")));

/// Schema for `GET /v1.0/creds/{id}` response bodies.
pub static CREDENTIAL: Lazy<JSONSchema> =
    Lazy::new(|| compile(include_str!("../schemas/credential.schema.json")));

/// Schema for `GET /v1.0/creds` response bodies.
pub static LIST_RESPONSE: Lazy<JSONSchema> =
    Lazy::new(|| compile(include_str!("../schemas/list_response.schema.json")));

/// Validate `instance` against `schema`, collapsing the validation error
/// iterator into a single human-readable message.
pub fn validate(schema: &JSONSchema, instance: &Value) -> Result<(), String> {
    schema.validate(instance).map_err(|errors| {
        errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    })
}
