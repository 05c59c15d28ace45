// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verifree_subnet_helper::{
    api::router,
    blockchain::{MessageRelayer, SubnetClient},
    config::{AppConfig, LOG_FORMAT_ENV},
    state::AppState,
    storage::{DataApiStore, DocumentStore, InMemoryDocumentStore},
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting VeriFree subnet helper");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "FATAL: invalid configuration");
        e
    })?;

    if config.api_key.is_none() {
        warn!("VERIFREE_API_KEY not set - control endpoints will refuse every call");
    }

    let store: Arc<dyn DocumentStore> = match &config.store {
        Some(data_api) => {
            info!(url = %data_api.url, database = %data_api.database, "Using Data API store");
            Arc::new(DataApiStore::new(data_api, config.http_timeout)?)
        }
        None => {
            warn!("DB_API_URL not set - using in-memory store, data is lost on restart");
            Arc::new(InMemoryDocumentStore::for_collections(&config.collections))
        }
    };

    let relayer: Option<Arc<dyn MessageRelayer>> = match &config.relay {
        Some(relay) => {
            let client = SubnetClient::new(relay, config.http_timeout)?;
            info!(
                chain = %client.chain().name,
                chain_id = client.chain().chain_id,
                signer = %client.signer_address(),
                "Subnet relay enabled"
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("SUBNET_RPC_URL not set - subnet relay disabled");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = router(AppState::new(config, store, relayer));

    info!(address = %addr, "Listening (docs at /docs)");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Subnet helper shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
