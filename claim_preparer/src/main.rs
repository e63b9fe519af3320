use std::{net::SocketAddr, sync::Arc, time::Duration};

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{bail, Context, Result};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use claim_core::{
    encoder::delegate_id, BatchCombinator, ClaimingDataLoader, DelegateTarget, LoaderSettings,
    StaticDeployments,
};
use clap::Parser;
use serde::Serialize;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    allocations_api::AllocationsApi,
    app_state::AppState,
    cfg::Cfg,
    data_source::ChainDataSource,
    eth_client::EthClient,
    http_handler::{get_claiming_data, post_claim_transaction},
};

mod allocations_api;
mod app_state;
mod cfg;
mod data_source;
mod eth_client;
mod http_handler;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging: controlled via RUST_LOG, e.g. RUST_LOG=info,claim_core=debug
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Cfg::parse();

    // A chain without both multisend deployments cannot batch claims at all.
    let combinator = BatchCombinator::new(&StaticDeployments::default(), cfg.chain_id)
        .context("resolve multisend deployments")?;

    let url: reqwest::Url = cfg.eth_rpc_url.parse().context("parse ETH_RPC_URL")?;
    let provider = ProviderBuilder::new().connect_http(url).erased();
    let rpc_chain_id = provider
        .get_chain_id()
        .await
        .context("query chain id from ETH_RPC_URL")?;
    if rpc_chain_id != cfg.chain_id {
        bail!(
            "ETH_RPC_URL serves chain {} but CHAIN_ID is {}",
            rpc_chain_id,
            cfg.chain_id
        );
    }

    let load_timeout = Duration::from_secs(cfg.load_timeout_secs);
    let source = ChainDataSource {
        eth: EthClient { provider },
        allocations: AllocationsApi::new(&cfg.allocations_url, cfg.chain_id, load_timeout)?,
    };
    let delegate_target = DelegateTarget {
        registry: cfg.delegate_registry_address,
        id: delegate_id(&cfg.delegate_id),
    };
    let loader = ClaimingDataLoader::new(
        Arc::new(source),
        LoaderSettings {
            deadline: load_timeout,
            max_in_flight: cfg.max_in_flight_reads,
            token: cfg.safe_token_address,
            delegate_registry: delegate_target.registry,
            delegate_id: delegate_target.id,
        },
    );

    let state = AppState {
        loader: Arc::new(loader),
        combinator: Arc::new(combinator),
        delegate_target,
    };

    // HTTP server
    let app = Router::new()
        .route("/health", get(health))
        .route("/claiming_data", get(get_claiming_data))
        .route("/claim_transaction", post(post_claim_transaction))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("listening on {} for chain {}", addr, cfg.chain_id);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");

    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires, so the server keeps running on the other one.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, draining requests"),
        _ = terminate => info!("SIGTERM received, draining requests"),
    }
}
