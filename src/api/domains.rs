// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::ApiKey,
    error::{ApiError, ErrorBody},
    models::AddDomainRequest,
    state::AppState,
    sync::DomainSyncOutcome,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AddDomainResponse {
    pub message: String,
    pub outcome: DomainSyncOutcome,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmailDomainCheck {
    pub email: String,
    /// True when the email ends with a registered domain.
    pub valid: bool,
}

/// Register an approved email domain.
#[utoipa::path(
    post,
    path = "/api/update-validdomains",
    tag = "Domains",
    request_body = AddDomainRequest,
    params(("x-api-key" = String, Header, description = "Service API key")),
    responses(
        (status = 200, description = "Domain registered or already present", body = AddDomainResponse),
        (status = 400, description = "Invalid domain", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn add_valid_domain(
    _key: ApiKey,
    State(state): State<AppState>,
    body: Result<Json<AddDomainRequest>, JsonRejection>,
) -> Result<Json<AddDomainResponse>, ApiError> {
    let Json(request) = body?;
    let domain = request
        .domain
        .ok_or_else(|| ApiError::bad_request("Invalid domain"))?;

    let outcome = state.domains.add_domain(&domain).await?;

    Ok(Json(AddDomainResponse {
        message: "Valid domains updated.".to_string(),
        outcome,
    }))
}

/// List approved email domains.
#[utoipa::path(
    get,
    path = "/api/valid-domains",
    tag = "Domains",
    responses(
        (status = 200, description = "Registered domains", body = [String]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_valid_domains(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.domains.list_domains().await?))
}

/// Check an email address against the approved domains.
#[utoipa::path(
    get,
    path = "/api/check-email",
    tag = "Domains",
    params(("email" = String, Query, description = "Email address to check")),
    responses(
        (status = 200, description = "Domain check result", body = EmailDomainCheck),
        (status = 400, description = "Missing email", body = ErrorBody),
        (status = 500, description = "Store failure or no domains registered", body = ErrorBody)
    )
)]
pub async fn check_email_domain(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<EmailDomainCheck>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let email = query
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let valid = state.domains.is_valid_email_domain(&email).await?;
    Ok(Json(EmailDomainCheck { email, valid }))
}
