// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Approved email domain registry.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::SyncError;
use crate::storage::{DomainRepository, StoreError};

/// Result of [`DomainRegistry::add_domain`].
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DomainSyncOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Clone)]
pub struct DomainRegistry {
    repo: DomainRepository,
}

impl DomainRegistry {
    pub fn new(repo: DomainRepository) -> Self {
        Self { repo }
    }

    /// Register a domain such as `@mit.edu`. Idempotent.
    pub async fn add_domain(&self, domain: &str) -> Result<DomainSyncOutcome, SyncError> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(SyncError::Validation("Domain is required".to_string()));
        }

        if self.repo.exists(domain).await? {
            info!(domain, "Domain already registered");
            return Ok(DomainSyncOutcome::AlreadyPresent);
        }

        match self.repo.insert(domain).await {
            Ok(()) => {
                info!(domain, "Domain registered");
                Ok(DomainSyncOutcome::Added)
            }
            // Lost a race with a concurrent insert of the same domain.
            Err(StoreError::Duplicate(_)) => {
                info!(domain, "Domain registered concurrently");
                Ok(DomainSyncOutcome::AlreadyPresent)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_domains(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.repo.list().await?)
    }

    /// Check whether an email address belongs to a registered domain.
    ///
    /// An empty registry is reported as an error rather than `false`, since
    /// it almost always means the store is misconfigured.
    pub async fn is_valid_email_domain(&self, email: &str) -> Result<bool, SyncError> {
        let domains = self.list_domains().await?;
        if domains.is_empty() {
            return Err(SyncError::Upstream("No allowed domains found".to_string()));
        }
        let email = email.trim().to_ascii_lowercase();
        Ok(domains
            .iter()
            .any(|domain| email.ends_with(&domain.to_ascii_lowercase())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::{InMemoryDocumentStore, WriteKind};

    fn registry() -> (Arc<InMemoryDocumentStore>, DomainRegistry) {
        let store = Arc::new(InMemoryDocumentStore::new().with_unique_key("domains", "domain"));
        let registry = DomainRegistry::new(DomainRepository::new(store.clone(), "domains"));
        (store, registry)
    }

    #[tokio::test]
    async fn adding_twice_keeps_one_record() {
        let (store, registry) = registry();

        assert_eq!(
            registry.add_domain("@mit.edu").await.unwrap(),
            DomainSyncOutcome::Added
        );
        assert_eq!(
            registry.add_domain("@mit.edu").await.unwrap(),
            DomainSyncOutcome::AlreadyPresent
        );

        assert_eq!(store.documents("domains").await.len(), 1);
        let inserts = store
            .writes()
            .await
            .into_iter()
            .filter(|w| w.kind == WriteKind::Insert)
            .count();
        assert_eq!(inserts, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_insert_is_absorbed() {
        let (_store, registry) = registry();
        // Bypass the existence check by inserting through the repository.
        registry.repo.insert("@ethz.ch").await.unwrap();

        let err = registry.repo.insert("@ethz.ch").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(
            registry.add_domain("@ethz.ch").await.unwrap(),
            DomainSyncOutcome::AlreadyPresent
        );
    }

    #[tokio::test]
    async fn blank_domain_is_rejected_before_store_access() {
        let (store, registry) = registry();
        let err = registry.add_domain("   ").await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn email_domain_check() {
        let (_store, registry) = registry();
        assert!(matches!(
            registry.is_valid_email_domain("a@mit.edu").await,
            Err(SyncError::Upstream(_))
        ));

        registry.add_domain("@mit.edu").await.unwrap();
        registry.add_domain("@epfl.ch").await.unwrap();

        assert!(registry.is_valid_email_domain("Alice@MIT.edu").await.unwrap());
        assert!(!registry.is_valid_email_domain("bob@gmail.com").await.unwrap());
        assert_eq!(
            registry.list_domains().await.unwrap(),
            vec!["@mit.edu".to_string(), "@epfl.ch".to_string()]
        );
    }
}
