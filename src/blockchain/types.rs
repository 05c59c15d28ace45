// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and payload codecs.

use std::str::FromStr;

use alloy::{
    primitives::{Address, B256},
    sol_types::SolValue,
};
use serde::Serialize;

use super::ChainError;
use crate::models::{normalize_address, AllowListFlags};

/// Native currency metadata of the subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Subnet network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    pub currency: NativeCurrency,
}

/// Fixed arguments of every relayed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTarget {
    /// Subnet control contract receiving the messages.
    pub control_address: Address,
    pub origin_chain_id: B256,
    /// Contract on the origin chain that emitted the messages.
    pub origin_sender: Address,
}

impl RelayTarget {
    pub fn parse(
        control_address: &str,
        origin_chain_id: &str,
        origin_sender: &str,
    ) -> Result<Self, ChainError> {
        Ok(Self {
            control_address: parse_address(control_address)?,
            origin_chain_id: parse_origin_chain_id(origin_chain_id)?,
            origin_sender: parse_address(origin_sender)?,
        })
    }
}

fn parse_address(raw: &str) -> Result<Address, ChainError> {
    Address::from_str(raw.trim()).map_err(|e| ChainError::InvalidAddress(format!("{raw}: {e}")))
}

/// Parse an origin chain identifier.
///
/// Accepts a 32-byte hex value, or a short string (at most 31 bytes) that
/// is UTF-8 encoded and right-padded with zeros, the way `bytes32` string
/// constants are produced by Solidity tooling.
pub fn parse_origin_chain_id(raw: &str) -> Result<B256, ChainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChainError::InvalidChainId("empty origin chain id".to_string()));
    }

    if let Some(hex) = trimmed.strip_prefix("0x") {
        return B256::from_str(hex)
            .map_err(|e| ChainError::InvalidChainId(format!("{trimmed}: {e}")));
    }

    let bytes = trimmed.as_bytes();
    if bytes.len() > 31 {
        return Err(ChainError::InvalidChainId(format!(
            "{trimmed}: string longer than 31 bytes"
        )));
    }
    let mut padded = [0u8; 32];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(padded))
}

/// Allowlist update carried by a relayed message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AllowListMessage {
    pub address: String,
    pub flags: AllowListFlags,
}

/// Decode an ABI-encoded `(address, bool, bool, bool, bool, bool)` payload.
pub fn decode_allowlist_message(payload: &[u8]) -> Result<AllowListMessage, ChainError> {
    let (
        address,
        transactions_allowed,
        transactions_admin,
        contracts_allowed,
        contracts_admin,
        mint_subnet_vsbt,
    ) = <(Address, bool, bool, bool, bool, bool)>::abi_decode(payload)
        .map_err(|e| ChainError::InvalidMessage(e.to_string()))?;

    Ok(AllowListMessage {
        address: normalize_address(&address.to_string()),
        flags: AllowListFlags {
            transactions_allowed,
            transactions_admin,
            contracts_allowed,
            contracts_admin,
            mint_subnet_vsbt,
        },
    })
}
