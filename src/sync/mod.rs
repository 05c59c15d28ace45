// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Synchronization Services
//!
//! The three operations invoked by oracle scripts on behalf of the
//! VeriFree contracts:
//!
//! - [`DomainRegistry`]: approved email domains
//! - [`AllowListSync`]: per-address subnet permissions
//! - [`RelayDispatcher`]: deduplicated relay of allowlist messages to the
//!   subnet control contract
//!
//! Services own their repositories and are cheap to clone.

pub mod allowlist;
pub mod domains;
pub mod jitter;
pub mod relay;

pub use allowlist::{AllowListSync, AllowListSyncOutcome};
pub use domains::{DomainRegistry, DomainSyncOutcome};
pub use jitter::Jitter;
pub use relay::{RelayDispatcher, RelayOutcome};

use crate::blockchain::ChainError;
use crate::storage::StoreError;

/// Errors surfaced by the synchronization services.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Malformed or incomplete input, rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The store or the chain failed.
    #[error("{0}")]
    Upstream(String),

    /// The operation needs a component that is not configured.
    #[error("{0}")]
    NotConfigured(&'static str),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Upstream(err.to_string())
    }
}

impl From<ChainError> for SyncError {
    fn from(err: ChainError) -> Self {
        SyncError::Upstream(err.to_string())
    }
}
