// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        AddDomainRequest, AllowListField, AllowListFlags, AllowListRecord, RelayMessageRequest,
        RelayStatus, UpdateAllowListRequest,
    },
    state::AppState,
    sync::{AllowListSyncOutcome, DomainSyncOutcome},
};

pub mod allowlist;
pub mod domains;
pub mod health;
pub mod subnet;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/update-allowlist", post(allowlist::update_allow_list))
        .route(
            "/update-subnet-allowlist",
            post(subnet::update_subnet_allow_list),
        )
        .route("/update-validdomains", post(domains::add_valid_domain))
        .route("/valid-domains", get(domains::list_valid_domains))
        .route("/check-email", get(domains::check_email_domain));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        allowlist::update_allow_list,
        subnet::update_subnet_allow_list,
        domains::add_valid_domain,
        domains::list_valid_domains,
        domains::check_email_domain,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ErrorBody,
            UpdateAllowListRequest,
            AllowListRecord,
            AllowListFlags,
            AllowListField,
            AllowListSyncOutcome,
            allowlist::UpdateAllowListResponse,
            RelayMessageRequest,
            RelayStatus,
            subnet::RelayMessageResponse,
            AddDomainRequest,
            DomainSyncOutcome,
            domains::AddDomainResponse,
            domains::EmailDomainCheck,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Allowlist", description = "Subnet allowlist synchronization"),
        (name = "Subnet", description = "Relay of allowlist messages to the subnet"),
        (name = "Domains", description = "Approved email domains"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
