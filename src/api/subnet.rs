// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::ApiKey,
    error::{ApiError, ErrorBody},
    models::{RelayMessageRequest, RelayStatus},
    state::AppState,
    sync::RelayOutcome,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct RelayMessageResponse {
    pub message: String,
    /// `true` when a transaction was submitted by this call.
    pub submitted: bool,
    /// Hash of the submitted transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Ledger status of a message that was not resubmitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_status: Option<RelayStatus>,
}

/// Relay an ABI-encoded allowlist message to the subnet control contract.
///
/// Messages are deduplicated: a message already relayed (or in flight) is
/// acknowledged without a new transaction. A message whose previous relay
/// failed is retried.
#[utoipa::path(
    post,
    path = "/api/update-subnet-allowlist",
    tag = "Subnet",
    request_body = RelayMessageRequest,
    params(("x-api-key" = String, Header, description = "Service API key")),
    responses(
        (status = 200, description = "Message relayed or already handled", body = RelayMessageResponse),
        (status = 400, description = "Invalid message", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Relay not configured, store or chain failure", body = ErrorBody)
    )
)]
pub async fn update_subnet_allow_list(
    _key: ApiKey,
    State(state): State<AppState>,
    body: Result<Json<RelayMessageRequest>, JsonRejection>,
) -> Result<Json<RelayMessageResponse>, ApiError> {
    let Json(request) = body?;
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid message"))?;

    let response = match state.relay.relay_allowlist_message(&message).await? {
        // The hash is recorded in the background; the response does not wait.
        RelayOutcome::Submitted { tx_hash, .. } => RelayMessageResponse {
            message: "Subnet Allowlist updated.".to_string(),
            submitted: true,
            transaction_hash: Some(tx_hash),
            ledger_status: None,
        },
        RelayOutcome::Skipped { status } => RelayMessageResponse {
            message: "Message already relayed.".to_string(),
            submitted: false,
            transaction_hash: None,
            ledger_status: Some(status),
        },
    };

    Ok(Json(response))
}
