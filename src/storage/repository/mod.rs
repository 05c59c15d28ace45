// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository owns one collection and translates between records and
//! store documents. Repositories are cheap to clone (they share the store
//! handle) so they can be moved into background tasks.

pub mod allowlist;
pub mod domains;
pub mod messages;

pub use allowlist::AllowListRepository;
pub use domains::DomainRepository;
pub use messages::MessageRepository;
