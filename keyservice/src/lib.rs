//! The yar credential service: a RESTful front-end over a document-database
//! key store, exposing `/v1.0/creds` and `/v1.0/creds/{id}`.

#![warn(missing_docs)]

mod config;
mod error;
mod handlers;
mod schema;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{Cli, Config, LogLevel};
pub use error::{Result, ServiceError};
pub use handlers::AppState;

use yar_keystore::KeyStoreGateway;

/// Build the service's router, wired to a key store at `config.key_store`.
pub fn app(config: &Config) -> Router {
    let store = KeyStoreGateway::new(config.key_store.clone(), config.store_timeout);
    let state = Arc::new(AppState { store });

    Router::new()
        .route(
            "/v1.0/creds",
            get(handlers::list_credentials).post(handlers::create_credential),
        )
        .route(
            "/v1.0/creds/:id",
            get(handlers::get_credential).delete(handlers::delete_credential),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Build a router against an already-constructed gateway, for tests that
/// stub the key store with `wiremock`.
pub fn app_with_store(store: KeyStoreGateway) -> Router {
    let state = Arc::new(AppState { store });
    Router::new()
        .route(
            "/v1.0/creds",
            get(handlers::list_credentials).post(handlers::create_credential),
        )
        .route(
            "/v1.0/creds/:id",
            get(handlers::get_credential).delete(handlers::delete_credential),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
