// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Control endpoints are called by oracle scripts, not users, and are
//! protected by a shared secret:
//!
//! 1. The oracle script sends `x-api-key: <secret>`
//! 2. The [`ApiKey`] extractor compares it in constant time with
//!    `VERIFREE_API_KEY`
//! 3. A missing server-side key refuses every control call with 500
//!
//! Read-only endpoints (`/api/valid-domains`, health) are public.

pub mod error;
pub mod extractor;

pub use error::AuthError;
pub use extractor::{ApiKey, API_KEY_HEADER};
