// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for API-key protected endpoints.
//!
//! ```rust,ignore
//! async fn my_handler(_key: ApiKey, State(state): State<AppState>) -> impl IntoResponse {
//!     // only reached with a valid x-api-key header
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;

use super::AuthError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried the configured API key.
#[derive(Debug)]
pub struct ApiKey;

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state
            .config
            .api_key
            .as_deref()
            .ok_or(AuthError::ApiKeyNotConfigured)?;

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .ok_or(AuthError::MissingApiKey)?
            .to_str()
            .map_err(|_| AuthError::InvalidApiKey)?;

        if provided.len() == expected.len() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(ApiKey)
        } else {
            tracing::warn!("Rejected request with invalid API key");
            Err(AuthError::InvalidApiKey)
        }
    }
}
