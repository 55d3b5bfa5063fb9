//! Process entry point: builds the `GameManager`, wires an in-memory escrow
//! mock (spec.md §4.7/§9 — "the core depends on a narrow four-method
//! interface, not any specific chain implementation"; no real chain SDK is
//! fabricated here, see DESIGN.md), spawns the tick loop as a background
//! task, and serves the HTTP surface. Grounded on the teacher `poker-ws`
//! `main.rs` (axum `Router`, `tracing_subscriber` init, `tower_http`
//! middleware), generalized from its single WS-only router to the
//! request/response HTTP API spec.md §6 calls for.

mod auth;
mod dto;
mod error;
mod routes;
mod state;
mod ws;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use poker_engine::escrow::MockEscrowClient;
use poker_engine::{run_ticker, Config, GameManager};

use crate::auth::ApiKeyStore;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let manager = Arc::new(GameManager::new(Config::default()));
    let state = Arc::new(AppState {
        manager: manager.clone(),
        escrow: MockEscrowClient::new(),
        api_keys: ApiKeyStore::new(),
    });

    tokio::spawn(run_ticker(manager));

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr: std::net::SocketAddr = "0.0.0.0:8080".parse().expect("hardcoded address is valid");
    info!(%addr, "starting poker server");
    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server loop exited unexpectedly");
}
