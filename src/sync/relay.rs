// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subnet relay dispatcher.
//!
//! Each allowlist message is relayed to the subnet control contract at most
//! once per successful relay. The ledger entry is the claim:
//!
//! ```text
//! lookup
//!   absent     -> insert {message, pending} -> relay
//!                   \-> duplicate (lost a race) -> treat as present
//!   present    -> status failed && claim_retry() -> relay
//!              -> otherwise                      => Skipped
//! relay: simulate -> send -> spawn(mark succeeded)   => Submitted
//!                      \-> error -> mark failed -> propagate
//! ```
//!
//! The claim, relay and mark steps run in a spawned task, so a dropped
//! caller (client disconnect, shutdown) cannot strand an entry in
//! `pending`.
//!
//! The store only rejects concurrent inserts of one message when the ledger
//! collection has a unique index on `message`. Without it the lookup still
//! prevents sequential resubmission.
//!
//! A send that times out may already have been broadcast. The entry is then
//! marked `failed` and a retry submits a second transaction; the control
//! contract applies the same flags again, so the replay is harmless.

use std::sync::Arc;

use alloy::primitives::Bytes;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::SyncError;
use crate::blockchain::{decode_allowlist_message, MessageRelayer};
use crate::models::{normalize_message, RelayStatus};
use crate::storage::{MessageRepository, StoreError};

/// Result of [`RelayDispatcher::relay_allowlist_message`].
#[derive(Debug)]
pub enum RelayOutcome {
    /// The transaction was submitted. `recording` completes once the hash
    /// is stored in the ledger (or the attempt failed and was logged).
    Submitted {
        tx_hash: String,
        recording: JoinHandle<()>,
    },
    /// The message was already relayed or is in flight.
    Skipped { status: RelayStatus },
}

/// Whether this caller owns the relay of a message.
enum Claim {
    Won,
    Held(RelayStatus),
}

#[derive(Clone)]
pub struct RelayDispatcher {
    ledger: MessageRepository,
    relayer: Option<Arc<dyn MessageRelayer>>,
}

impl RelayDispatcher {
    /// `relayer` is `None` when the subnet is not configured; relays then
    /// fail without touching the ledger.
    pub fn new(ledger: MessageRepository, relayer: Option<Arc<dyn MessageRelayer>>) -> Self {
        Self { ledger, relayer }
    }

    pub fn is_configured(&self) -> bool {
        self.relayer.is_some()
    }

    pub async fn relay_allowlist_message(&self, raw: &str) -> Result<RelayOutcome, SyncError> {
        let message = normalize_message(raw);
        let payload = parse_payload(&message)?;
        let relayer = self
            .relayer
            .clone()
            .ok_or(SyncError::NotConfigured("subnet relay not configured"))?;

        match decode_allowlist_message(&payload) {
            Ok(decoded) => info!(
                message = %message,
                address = %decoded.address,
                flags = ?decoded.flags,
                "Relaying allowlist message"
            ),
            Err(e) => warn!(message = %message, error = %e, "Relaying undecodable message"),
        }

        let ledger = self.ledger.clone();
        tokio::spawn(dispatch(ledger, relayer, message, payload))
            .await
            .map_err(|e| SyncError::Upstream(format!("relay task failed: {e}")))?
    }
}

async fn dispatch(
    ledger: MessageRepository,
    relayer: Arc<dyn MessageRelayer>,
    message: String,
    payload: Bytes,
) -> Result<RelayOutcome, SyncError> {
    if let Claim::Held(status) = claim(&ledger, &message).await? {
        info!(message = %message, status = status.as_str(), "Message already relayed, skipping");
        return Ok(RelayOutcome::Skipped { status });
    }

    let tx_hash = match relayer.relay(&payload).await {
        Ok(tx_hash) => tx_hash,
        Err(e) => {
            error!(message = %message, error = %e, "Relay failed");
            if let Err(mark_err) = ledger.mark_failed(&message, &e.to_string()).await {
                warn!(message = %message, error = %mark_err, "Failed to mark relay as failed");
            }
            return Err(e.into());
        }
    };
    info!(message = %message, tx_hash = %tx_hash, "Relay transaction submitted");

    let recorded_hash = tx_hash.clone();
    let recording = tokio::spawn(async move {
        if let Err(e) = ledger.mark_succeeded(&message, &recorded_hash).await {
            warn!(message = %message, tx_hash = %recorded_hash, error = %e, "Failed to record relay transaction hash");
        }
    });

    Ok(RelayOutcome::Submitted { tx_hash, recording })
}

async fn claim(ledger: &MessageRepository, message: &str) -> Result<Claim, SyncError> {
    let existing = match ledger.get(message).await? {
        Some(record) => record.status,
        None => match ledger.insert_pending(message).await {
            Ok(()) => return Ok(Claim::Won),
            // Lost a race with a concurrent insert of the same message.
            Err(StoreError::Duplicate(_)) => ledger
                .get(message)
                .await?
                .map(|record| record.status)
                .unwrap_or_default(),
            Err(e) => return Err(e.into()),
        },
    };

    if existing == RelayStatus::Failed && ledger.claim_retry(message).await? {
        info!(message = %message, "Retrying previously failed relay");
        return Ok(Claim::Won);
    }
    Ok(Claim::Held(existing))
}

fn parse_payload(message: &str) -> Result<Bytes, SyncError> {
    let hex = &message[2..];
    if hex.is_empty() {
        return Err(SyncError::Validation("Message is required".to_string()));
    }
    alloy::hex::decode(hex)
        .map(Bytes::from)
        .map_err(|e| SyncError::Validation(format!("Invalid message hex: {e}")))
}
