// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Allowlist repository.
//!
//! Records are keyed by normalized address. Callers must pass normalized
//! addresses (see [`crate::models::normalize_address`]).

use std::sync::Arc;

use serde_json::{json, Value};

use super::super::{
    document, from_document, Document, DocumentStore, StoreResult, UpdateResult,
};
use crate::models::{AllowListField, AllowListFlags, AllowListRecord};

#[derive(Clone)]
pub struct AllowListRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl AllowListRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn key(address: &str) -> Document {
        document(json!({ "address": address }))
    }

    /// Get the record for an address, if any.
    pub async fn get(&self, address: &str) -> StoreResult<Option<AllowListRecord>> {
        self.store
            .find_one(&self.collection, Self::key(address))
            .await?
            .map(from_document::<AllowListRecord>)
            .transpose()
    }

    /// Atomically create the record, or overwrite all flags of an existing
    /// one, in a single conditional update.
    pub async fn upsert(&self, record: &AllowListRecord) -> StoreResult<UpdateResult> {
        self.store
            .update_one(
                &self.collection,
                Self::key(&record.address),
                flag_fields(&record.flags, &AllowListField::ALL),
                true,
            )
            .await
    }

    /// Set only the given flags on an existing record. The key is never part
    /// of the update.
    pub async fn set_flags(
        &self,
        address: &str,
        flags: &AllowListFlags,
        fields: &[AllowListField],
    ) -> StoreResult<UpdateResult> {
        self.store
            .update_one(
                &self.collection,
                Self::key(address),
                flag_fields(flags, fields),
                false,
            )
            .await
    }
}

fn flag_fields(flags: &AllowListFlags, fields: &[AllowListField]) -> Document {
    fields
        .iter()
        .map(|field| (field.key().to_string(), Value::Bool(flags.get(*field))))
        .collect()
}
