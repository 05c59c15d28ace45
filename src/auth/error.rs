// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API key authentication error.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The server has no API key configured; every control call is refused.
    ApiKeyNotConfigured,
    /// No `x-api-key` header present
    MissingApiKey,
    /// Header present but not equal to the configured key
    InvalidApiKey,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::ApiKeyNotConfigured => "api_key_not_configured",
            AuthError::MissingApiKey => "missing_api_key",
            AuthError::InvalidApiKey => "invalid_api_key",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ApiKeyNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingApiKey | AuthError::InvalidApiKey => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::ApiKeyNotConfigured => write!(f, "API key not set"),
            AuthError::MissingApiKey | AuthError::InvalidApiKey => {
                write!(f, "Please send a valid API key")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
