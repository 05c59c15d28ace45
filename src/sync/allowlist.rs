// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Allowlist synchronization.
//!
//! Brings the stored record of an address in line with an incoming record:
//!
//! ```text
//! jitter -> findOne {address}
//!   none            -> updateOne {address} {$set: all flags} upsert  => Inserted
//!   flags differ    -> updateOne {address} {$set: changed flags}     => Updated
//!   flags equal     -> no write                                      => Unchanged
//! ```
//!
//! First inserts go through an atomic upsert, so concurrent calls for a new
//! address can never create two records. Concurrent *differing* updates of
//! an existing record remain last-writer-wins between the lookup and the
//! `$set`; the jitter only makes that window less likely to be hit.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::{Jitter, SyncError};
use crate::models::{AllowListField, AllowListRecord};
use crate::storage::AllowListRepository;

/// Result of [`AllowListSync::update_allow_list`].
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllowListSyncOutcome {
    Inserted,
    Updated { changed: Vec<AllowListField> },
    Unchanged,
}

#[derive(Clone)]
pub struct AllowListSync {
    repo: AllowListRepository,
    jitter: Jitter,
}

impl AllowListSync {
    pub fn new(repo: AllowListRepository, jitter: Jitter) -> Self {
        Self { repo, jitter }
    }

    /// Sync one address. `record.address` is normalized again here, so
    /// callers may pass raw input.
    pub async fn update_allow_list(
        &self,
        record: AllowListRecord,
    ) -> Result<AllowListSyncOutcome, SyncError> {
        let record = AllowListRecord::new(&record.address, record.flags);
        if record.address == "0x" {
            return Err(SyncError::Validation(
                "Invalid allowlist: missing address".to_string(),
            ));
        }

        let delay = self.jitter.wait().await;
        tracing::debug!(address = %record.address, delay_ms = delay.as_millis() as u64, "Jitter elapsed");

        let Some(existing) = self.repo.get(&record.address).await? else {
            let result = self.repo.upsert(&record).await?;
            if result.upserted {
                info!(address = %record.address, "Allowlist record inserted");
                return Ok(AllowListSyncOutcome::Inserted);
            }
            // A concurrent call created the record first; our $set carried
            // every flag, so report what it changed.
            return Ok(if result.modified_count > 0 {
                info!(address = %record.address, "Allowlist record overwritten after concurrent insert");
                AllowListSyncOutcome::Updated {
                    changed: AllowListField::ALL.to_vec(),
                }
            } else {
                AllowListSyncOutcome::Unchanged
            });
        };

        let changed = existing.flags.changed_fields(&record.flags);
        if changed.is_empty() {
            info!(address = %record.address, "Allowlist record unchanged");
            return Ok(AllowListSyncOutcome::Unchanged);
        }

        self.repo
            .set_flags(&record.address, &record.flags, &changed)
            .await?;
        info!(address = %record.address, changed = ?changed, "Allowlist record updated");
        Ok(AllowListSyncOutcome::Updated { changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::models::AllowListFlags;
    use crate::storage::{document, InMemoryDocumentStore, WriteKind};

    fn sync() -> (Arc<InMemoryDocumentStore>, AllowListSync) {
        let store = Arc::new(InMemoryDocumentStore::new().with_unique_key("allowlist", "address"));
        let sync = AllowListSync::new(
            AllowListRepository::new(store.clone(), "allowlist"),
            Jitter::none(),
        );
        (store, sync)
    }

    fn flags(transactions_admin: bool) -> AllowListFlags {
        AllowListFlags {
            transactions_allowed: true,
            transactions_admin,
            contracts_allowed: true,
            contracts_admin: false,
            mint_subnet_vsbt: false,
        }
    }

    #[tokio::test]
    async fn insert_then_targeted_update() {
        let (store, sync) = sync();
        let raw = "ABCDEF0000000000000000000000000000000001";

        let outcome = sync
            .update_allow_list(AllowListRecord {
                address: raw.to_string(),
                flags: flags(false),
            })
            .await
            .unwrap();
        assert_eq!(outcome, AllowListSyncOutcome::Inserted);

        let docs = store.documents("allowlist").await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["address"], json!("0xabcdef0000000000000000000000000000000001"));

        let outcome = sync
            .update_allow_list(AllowListRecord::new(raw, flags(true)))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AllowListSyncOutcome::Updated {
                changed: vec![AllowListField::TransactionsAdmin]
            }
        );

        let writes = store.writes().await;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1].kind, WriteKind::Update);
        assert_eq!(writes[1].fields, document(json!({ "transactionsAdmin": true })));
        assert_eq!(store.documents("allowlist").await[0]["transactionsAdmin"], json!(true));
    }

    #[tokio::test]
    async fn identical_record_writes_nothing() {
        let (store, sync) = sync();
        let record = AllowListRecord::new("0xabc", flags(false));

        sync.update_allow_list(record.clone()).await.unwrap();
        let writes_after_first = store.writes().await.len();

        let outcome = sync.update_allow_list(record).await.unwrap();
        assert_eq!(outcome, AllowListSyncOutcome::Unchanged);
        assert_eq!(store.writes().await.len(), writes_after_first);
    }

    #[tokio::test]
    async fn address_format_does_not_create_new_records() {
        let (store, sync) = sync();
        for address in ["ABC123", "abc123", "0xabc123", "0XABC123"] {
            sync.update_allow_list(AllowListRecord {
                address: address.to_string(),
                flags: flags(false),
            })
            .await
            .unwrap();
        }
        assert_eq!(store.documents("allowlist").await.len(), 1);
        assert_eq!(store.writes().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_address_is_rejected() {
        let (store, sync) = sync();
        let err = sync
            .update_allow_list(AllowListRecord {
                address: "  ".to_string(),
                flags: flags(false),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_first_syncs_create_one_record() {
        let (store, sync) = sync();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let sync = sync.clone();
            handles.push(tokio::spawn(async move {
                sync.update_allow_list(AllowListRecord::new("0xfeed", flags(true)))
                    .await
                    .unwrap()
            }));
        }
        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() == AllowListSyncOutcome::Inserted {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.documents("allowlist").await.len(), 1);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(AllowListSyncOutcome::Updated {
            changed: vec![AllowListField::MintSubnetVsbt],
        })
        .unwrap();
        assert_eq!(value, json!({ "status": "updated", "changed": ["mintSubnetVSBT"] }));
    }
}
