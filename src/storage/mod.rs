// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Store
//!
//! All off-chain state lives in a hosted document database reached through
//! its HTTP Data API. This module defines the [`DocumentStore`] seam the rest
//! of the service talks to, plus two backends:
//!
//! - [`DataApiStore`] - the production HTTP client
//! - [`InMemoryDocumentStore`] - a process-local store for tests and local
//!   development (selected when `DB_API_URL` is not set)
//!
//! ## Collections
//!
//! ```text
//! allowlist        { address, transactionsAllowed, ..., mintSubnetVSBT }
//! alloweddomains   { domain }
//! subnetmessages   { message, status, transactionHash?, error? }
//! ```
//!
//! Every record is addressed by one unique key and mutated with a single
//! conditional operation, so no multi-document transactions are needed.

pub mod data_api;
pub mod memory;
pub mod repository;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use data_api::DataApiStore;
pub use memory::{InMemoryDocumentStore, WriteKind, WriteRecord};
pub use repository::{AllowListRepository, DomainRepository, MessageRepository};

/// A JSON document as exchanged with the store.
pub type Document = Map<String, Value>;

/// Error type for document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insert rejected because a document with the same unique key exists.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Transport failure or non-success status from the store.
    #[error("Store request failed: {0}")]
    Request(String),

    /// The store answered with a body we could not interpret.
    #[error("Store response was invalid: {0}")]
    InvalidResponse(String),

    /// A stored document did not match the expected record shape.
    #[error("Stored document is malformed: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome counters of an `updateOne` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    /// True when the update inserted a new document (`upsert: true`).
    pub upserted: bool,
}

/// Minimal document-store API used by the repositories.
///
/// Filters are equality matches on top-level fields. Updates are `$set`
/// operations: only the given fields are written.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: Document)
        -> StoreResult<Option<Document>>;

    /// Insert a document. Fails with [`StoreError::Duplicate`] when the
    /// collection's unique key is already taken.
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// Apply `$set: set` to the first document matching `filter`. With
    /// `upsert`, a missing document is created from `filter` and `set`.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
        upsert: bool,
    ) -> StoreResult<UpdateResult>;
}

/// Build a [`Document`] from a `serde_json::json!` object literal.
///
/// Non-object values produce an empty document.
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Serialize a record into a [`Document`].
pub fn to_document<T: serde::Serialize>(record: &T) -> StoreResult<Document> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Malformed(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(StoreError::Malformed(e.to_string())),
    }
}

/// Deserialize a stored [`Document`] into a record.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> StoreResult<T> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Malformed(e.to_string()))
}
