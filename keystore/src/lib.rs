//! Async gateway between a credential service and its document-database
//! backing store.
//!
//! The store is addressed over HTTP, document-database style: documents are
//! fetched and written by id, and lookups by arbitrary field go through a
//! named view (`by_identifier`, `by_principal`) that returns rows wrapping
//! the matching documents.

#![warn(missing_docs)]

mod address;
mod client;
mod error;

pub use address::StoreAddress;
pub use client::{KeyStoreGateway, StoreRequest, StoreResponse};
pub use error::{Result, StoreError};
