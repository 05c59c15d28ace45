// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::MessageRelayer;
use crate::config::AppConfig;
use crate::storage::{
    AllowListRepository, DocumentStore, DomainRepository, InMemoryDocumentStore,
    MessageRepository,
};
use crate::sync::{AllowListSync, DomainRegistry, Jitter, RelayDispatcher};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub domains: DomainRegistry,
    pub allow_list: AllowListSync,
    pub relay: RelayDispatcher,
    /// Kept for readiness probes; `None` when the relay is not configured.
    pub relayer: Option<Arc<dyn MessageRelayer>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        relayer: Option<Arc<dyn MessageRelayer>>,
    ) -> Self {
        let collections = &config.collections;
        let domains = DomainRegistry::new(DomainRepository::new(
            store.clone(),
            collections.domains.clone(),
        ));
        let allow_list = AllowListSync::new(
            AllowListRepository::new(store.clone(), collections.allow_list.clone()),
            Jitter::new(config.max_jitter),
        );
        let relay = RelayDispatcher::new(
            MessageRepository::new(store.clone(), collections.messages.clone()),
            relayer.clone(),
        );

        Self {
            config: Arc::new(config),
            store,
            domains,
            allow_list,
            relay,
            relayer,
        }
    }

    /// State backed by a fresh in-memory store and no relay.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryDocumentStore::for_collections(&config.collections));
        Self::new(config, store, None)
    }
}
