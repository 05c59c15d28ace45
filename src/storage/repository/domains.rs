// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Approved email domain repository.

use std::sync::Arc;

use serde_json::json;

use super::super::{document, from_document, to_document, Document, DocumentStore, StoreResult};
use crate::models::DomainRecord;

#[derive(Clone)]
pub struct DomainRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl DomainRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Check if a domain is already registered.
    pub async fn exists(&self, domain: &str) -> StoreResult<bool> {
        let found = self
            .store
            .find_one(&self.collection, document(json!({ "domain": domain })))
            .await?;
        Ok(found.is_some())
    }

    /// Insert a domain. Fails with `StoreError::Duplicate` if the store
    /// enforces uniqueness and the domain exists.
    pub async fn insert(&self, domain: &str) -> StoreResult<()> {
        let record = DomainRecord {
            domain: domain.to_string(),
        };
        self.store
            .insert_one(&self.collection, to_document(&record)?)
            .await
    }

    /// All registered domains, in store order.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let docs = self.store.find(&self.collection, Document::new()).await?;
        docs.into_iter()
            .map(|doc| from_document::<DomainRecord>(doc).map(|record| record.domain))
            .collect()
    }
}
