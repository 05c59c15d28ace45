// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the VeriFree subnet.
//!
//! This module provides functionality for:
//! - Loading the relay signing key (hex or PEM)
//! - Simulating and submitting `receiveTeleporterMessage` calls
//! - Decoding relayed allowlist payloads

pub mod client;
pub mod signing;
pub mod subnet_control;
pub mod types;

use alloy::primitives::Bytes;
use async_trait::async_trait;

pub use client::SubnetClient;
pub use types::*;

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid origin chain id: {0}")]
    InvalidChainId(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid relay message: {0}")]
    InvalidMessage(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Something that can deliver a message to the subnet control contract.
///
/// Implemented by [`SubnetClient`] against a live RPC endpoint and by
/// scripted fakes in tests.
#[async_trait]
pub trait MessageRelayer: Send + Sync {
    /// Simulate then submit the relay call, returning the transaction hash.
    async fn relay(&self, message: &Bytes) -> Result<String, ChainError>;

    /// Current block number, used by readiness checks.
    async fn block_number(&self) -> Result<u64, ChainError>;
}
