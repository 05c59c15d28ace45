// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! VeriFree Subnet Helper - Allowlist Sync & Subnet Relay Service
//!
//! Oracle scripts running on behalf of the VeriFree contracts call this
//! service to mirror on-chain allowlist and email-domain changes into a
//! hosted document store, and to relay allowlist messages to the VeriFree
//! subnet.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - API key authentication
//! - `blockchain` - Subnet client and payload codecs (alloy)
//! - `storage` - Document store clients and repositories
//! - `sync` - Domain registry, allowlist sync and relay dispatcher

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod sync;
