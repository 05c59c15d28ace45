// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay ledger repository.
//!
//! The ledger is the idempotency record of the relay dispatcher: inserting a
//! message is how a caller claims it, and the status field tracks whether
//! the on-chain relay succeeded.
//!
//! ```text
//! (insert) -> pending -> succeeded
//!                     -> failed -> pending (claim_retry)
//! ```

use std::sync::Arc;

use serde_json::json;

use super::super::{document, from_document, to_document, DocumentStore, StoreResult};
use crate::models::{RelayStatus, RelayedMessageRecord};

#[derive(Clone)]
pub struct MessageRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl MessageRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Claim a message by inserting a `pending` entry.
    ///
    /// Fails with `StoreError::Duplicate` if the message was seen before.
    pub async fn insert_pending(&self, message: &str) -> StoreResult<()> {
        let record = RelayedMessageRecord {
            message: message.to_string(),
            status: RelayStatus::Pending,
            transaction_hash: None,
            error: None,
        };
        self.store
            .insert_one(&self.collection, to_document(&record)?)
            .await
    }

    pub async fn get(&self, message: &str) -> StoreResult<Option<RelayedMessageRecord>> {
        self.store
            .find_one(&self.collection, document(json!({ "message": message })))
            .await?
            .map(from_document::<RelayedMessageRecord>)
            .transpose()
    }

    /// Move a `failed` entry back to `pending`.
    ///
    /// Returns true only for the caller whose conditional update flipped the
    /// status, so concurrent retries of the same message relay it once.
    pub async fn claim_retry(&self, message: &str) -> StoreResult<bool> {
        let result = self
            .store
            .update_one(
                &self.collection,
                document(json!({
                    "message": message,
                    "status": RelayStatus::Failed.as_str(),
                })),
                document(json!({ "status": RelayStatus::Pending.as_str() })),
                false,
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Attach the transaction hash of a successful relay.
    pub async fn mark_succeeded(&self, message: &str, transaction_hash: &str) -> StoreResult<()> {
        self.store
            .update_one(
                &self.collection,
                document(json!({ "message": message })),
                document(json!({
                    "transactionHash": transaction_hash,
                    "status": RelayStatus::Succeeded.as_str(),
                })),
                false,
            )
            .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, message: &str, error: &str) -> StoreResult<()> {
        self.store
            .update_one(
                &self.collection,
                document(json!({ "message": message })),
                document(json!({
                    "status": RelayStatus::Failed.as_str(),
                    "error": error,
                })),
                false,
            )
            .await?;
        Ok(())
    }
}
