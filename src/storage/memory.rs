// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local document store.
//!
//! Mirrors the Data API semantics the repositories rely on: equality
//! filters, `$set` updates, upserts and per-collection unique keys. Every
//! accepted write is appended to a log so callers can assert exactly which
//! writes an operation performed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Document, DocumentStore, StoreError, StoreResult, UpdateResult};
use crate::config::Collections;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
}

/// One write accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub collection: String,
    pub kind: WriteKind,
    /// Inserted document, or the `$set` fields of an update.
    pub fields: Document,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    writes: Vec<WriteRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: Mutex<Inner>,
    unique_keys: HashMap<String, String>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the unique keys of the service's collections.
    pub fn for_collections(collections: &Collections) -> Self {
        Self::new()
            .with_unique_key(&collections.allow_list, "address")
            .with_unique_key(&collections.domains, "domain")
            .with_unique_key(&collections.messages, "message")
    }

    /// Reject inserts into `collection` whose `field` value already exists.
    pub fn with_unique_key(mut self, collection: &str, field: &str) -> Self {
        self.unique_keys
            .insert(collection.to_string(), field.to_string());
        self
    }

    /// All documents currently stored in `collection`.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        let inner = self.inner.lock().await;
        inner.collections.get(collection).cloned().unwrap_or_default()
    }

    /// Writes accepted so far, oldest first.
    pub async fn writes(&self) -> Vec<WriteRecord> {
        self.inner.lock().await.writes.clone()
    }

    fn violates_unique_key(&self, collection: &str, docs: &[Document], candidate: &Document) -> bool {
        let Some(key) = self.unique_keys.get(collection) else {
            return false;
        };
        let Some(value) = candidate.get(key) else {
            return false;
        };
        docs.iter().any(|doc| doc.get(key) == Some(value))
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, expected)| doc.get(field) == Some(expected))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> StoreResult<Option<Document>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)))
            .cloned())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let docs = inner.collections.entry(collection.to_string()).or_default();

        if self.violates_unique_key(collection, docs, &document) {
            return Err(StoreError::Duplicate(format!(
                "{collection}: document with the same key already exists"
            )));
        }

        docs.push(document.clone());
        inner.writes.push(WriteRecord {
            collection: collection.to_string(),
            kind: WriteKind::Insert,
            fields: document,
        });
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        let mut inner = self.inner.lock().await;
        let docs = inner.collections.entry(collection.to_string()).or_default();

        let result = match docs.iter_mut().find(|doc| matches(doc, &filter)) {
            Some(doc) => {
                let mut modified = false;
                for (field, value) in &set {
                    if doc.get(field) != Some(value) {
                        doc.insert(field.clone(), value.clone());
                        modified = true;
                    }
                }
                UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted: false,
                }
            }
            None if upsert => {
                let mut created = filter.clone();
                created.extend(set.clone());
                docs.push(created);
                UpdateResult {
                    matched_count: 0,
                    modified_count: 0,
                    upserted: true,
                }
            }
            None => UpdateResult::default(),
        };

        inner.writes.push(WriteRecord {
            collection: collection.to_string(),
            kind: WriteKind::Update,
            fields: set,
        });
        Ok(result)
    }
}
