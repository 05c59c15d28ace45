// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::ApiKey,
    error::{ApiError, ErrorBody},
    models::{AllowListRecord, UpdateAllowListRequest},
    state::AppState,
    sync::AllowListSyncOutcome,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateAllowListResponse {
    pub message: String,
    /// The record as stored (normalized address).
    pub allowlist: AllowListRecord,
    pub outcome: AllowListSyncOutcome,
}

/// Sync the permissions of one address into the allowlist collection.
#[utoipa::path(
    post,
    path = "/api/update-allowlist",
    tag = "Allowlist",
    request_body = UpdateAllowListRequest,
    params(("x-api-key" = String, Header, description = "Service API key")),
    responses(
        (status = 200, description = "Allowlist synced", body = UpdateAllowListResponse),
        (status = 400, description = "Invalid allowlist", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_allow_list(
    _key: ApiKey,
    State(state): State<AppState>,
    body: Result<Json<UpdateAllowListRequest>, JsonRejection>,
) -> Result<Json<UpdateAllowListResponse>, ApiError> {
    let Json(request) = body?;
    let record = request.into_record()?;

    let outcome = state.allow_list.update_allow_list(record.clone()).await?;

    Ok(Json(UpdateAllowListResponse {
        message: "Allowlist updated successfully".to_string(),
        allowlist: record,
        outcome,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::{router, test_support::*};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn update_allowlist_inserts_then_reports_unchanged() {
        let state = test_state();
        let app = router(state.clone());
        let body = json!({
            "address": "ABCDEF0000000000000000000000000000000001",
            "transactionsAllowed": true,
            "transactionsAdmin": false,
            "contractsAllowed": true,
            "contractsAdmin": false,
            "mintSubnetVSBT": false
        });

        let (status, json) = post_json(&app, "/api/update-allowlist", Some(TEST_API_KEY), body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"]["status"], "inserted");
        assert_eq!(json["allowlist"]["address"], "0xabcdef0000000000000000000000000000000001");

        let (status, json) = post_json(&app, "/api/update-allowlist", Some(TEST_API_KEY), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"]["status"], "unchanged");
    }

    #[tokio::test]
    async fn incomplete_allowlist_is_bad_request() {
        let app = router(test_state());
        let (status, json) = post_json(
            &app,
            "/api/update-allowlist",
            Some(TEST_API_KEY),
            json!({ "address": "0xabc", "transactionsAllowed": true }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("contractsAdmin"));
    }

    #[tokio::test]
    async fn wrong_api_key_is_unauthorized() {
        let app = router(test_state());
        let (status, _) = post_json(&app, "/api/update-allowlist", Some("nope"), json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
