//! The HTTP surface: a thin adapter over `GameManager`, composing the
//! escrow collaborator around `sit`/`leave`/`emergency-refund` per spec.md
//! §4.7. Every handler is a few lines translating a request body into one
//! `GameManager` call — no game logic lives here.
//!
//! Generic over `E: EscrowClient` throughout, for the same reason
//! `state.rs` is: the trait's native `async fn`s aren't dyn-compatible.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, warn};

use poker_engine::escrow::EscrowClient;
use poker_engine::{Action, AgentId};

use crate::auth::AgentAuth;
use crate::dto::*;
use crate::error::AppError;
use crate::state::AppState;
use crate::ws::ws_handler;

pub fn router<E: EscrowClient + Send + Sync + 'static>(state: Arc<AppState<E>>) -> Router {
    Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/{id}", get(get_table_public))
        .route("/tables/{id}/ws", get(ws_handler))
        .route("/tables/{id}/sit", post(sit))
        .route("/tables/{id}/leave", post(leave_public))
        .route("/tables/{id}/action", post(action_public))
        .route("/tables/{id}/rebuy", post(rebuy_public))
        .route("/tables/{id}/add-bot", post(add_bot))
        .route("/tables/{id}/emergency-refund", post(emergency_refund))
        .route("/leaderboard", get(leaderboard))
        .route("/api/agents/tables", get(list_tables))
        .route("/api/agents/tables/{id}", get(get_table_authenticated))
        .route("/api/agents/tables/{id}/action", post(action_authenticated))
        .route("/api/agents/tables/{id}/leave", post(leave_authenticated))
        .route("/api/agents/tables/{id}/rebuy", post(rebuy_authenticated))
        .route("/api/agents/leaderboard", get(leaderboard))
        .with_state(state)
}

async fn list_tables<E: EscrowClient>(State(state): State<Arc<AppState<E>>>) -> impl IntoResponse {
    Json(state.manager.list_tables())
}

async fn get_table_public<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.manager.get_table(&id, None)?))
}

async fn get_table_authenticated<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    AgentAuth(agent_id): AgentAuth,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.manager.get_table(&id, Some(&agent_id))?))
}

/// Escrow deposit, then `SitAgent`; a rejected sit (seat race, buy-in out
/// of range) triggers a compensating on-chain refund of the deposit, per
/// spec.md §4.7.
async fn sit<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Json(body): Json<SitBody>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(addr) = &body.wallet_address {
        if let Err(e) = state.escrow.deposit(&id, addr, body.buy_in_amount).await {
            warn!(table_id = %id, error = %e, "escrow deposit failed ahead of sit");
            return Err(AppError(poker_engine::EngineError::EscrowFailed(e.to_string())));
        }
    }

    let result = state.manager.sit_agent(
        &id,
        body.seat_number,
        &body.agent_name,
        body.buy_in_amount,
        body.wallet_address.clone(),
        false,
    );

    match result {
        Ok(agent_id) => {
            info!(table_id = %id, agent_id = %agent_id, "agent_sat");
            Ok(Json(AgentIdResponse { agent_id }))
        }
        Err(e) => {
            if let Some(addr) = &body.wallet_address {
                if let Err(refund_err) = state.escrow.settle(&id, addr, body.buy_in_amount).await {
                    warn!(table_id = %id, error = %refund_err, "compensating refund after rejected sit also failed");
                }
            }
            Err(AppError(e))
        }
    }
}

async fn leave_public<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Json(body): Json<LeaveBody>,
) -> Result<impl IntoResponse, AppError> {
    leave(&state, &id, &AgentId::new(body.agent_id)).await
}

async fn leave_authenticated<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    AgentAuth(agent_id): AgentAuth,
) -> Result<impl IntoResponse, AppError> {
    leave(&state, &id, &agent_id).await
}

/// `LeaveAgent` first, then settle the returned `cashOut` on-chain. A
/// failed settlement never rolls back `LeaveAgent` (spec.md §7:
/// external-transient errors never roll back engine state) — it surfaces
/// an `on-chain settlement failed` marker so the caller can fall back to
/// the emergency-refund endpoint.
async fn leave<E: EscrowClient>(state: &AppState<E>, table_id: &str, agent_id: &AgentId) -> Result<impl IntoResponse, AppError> {
    let outcome = state.manager.leave_agent(table_id, agent_id)?;
    let mut settlement_error = None;
    if let Some(addr) = &outcome.wallet_address {
        if let Err(e) = state.escrow.settle(table_id, addr, outcome.cash_out).await {
            warn!(table_id = %table_id, agent_id = %agent_id, error = %e, "on-chain settlement failed on leave");
            settlement_error = Some(e.to_string());
        }
    }
    Ok(Json(LeaveResponse {
        cash_out: outcome.cash_out,
        wallet_address: outcome.wallet_address,
        settlement_error,
    }))
}

async fn action_public<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Json(body): Json<ActionBody>,
) -> Result<impl IntoResponse, AppError> {
    let action = body.into_action()?;
    submit_action(&state, &id, &AgentId::new(body.agent_id), action)
}

async fn action_authenticated<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    AgentAuth(agent_id): AgentAuth,
    Json(body): Json<AgentActionBody>,
) -> Result<impl IntoResponse, AppError> {
    let action = body.into_action()?;
    submit_action(&state, &id, &agent_id, action)
}

fn submit_action<E: EscrowClient>(state: &AppState<E>, table_id: &str, agent_id: &AgentId, action: Action) -> Result<impl IntoResponse, AppError> {
    state.manager.submit_action(table_id, agent_id, action)?;
    Ok(StatusCode::OK)
}

async fn rebuy_public<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Json(body): Json<RebuyBody>,
) -> Result<impl IntoResponse, AppError> {
    state.manager.rebuy_agent(&id, &AgentId::new(body.agent_id), body.amount)?;
    Ok(StatusCode::OK)
}

async fn rebuy_authenticated<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    AgentAuth(agent_id): AgentAuth,
    Json(body): Json<AgentRebuyBody>,
) -> Result<impl IntoResponse, AppError> {
    state.manager.rebuy_agent(&id, &agent_id, body.amount)?;
    Ok(StatusCode::OK)
}

async fn add_bot<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Json(body): Json<AddBotBody>,
) -> Result<impl IntoResponse, AppError> {
    let strategy = poker_engine::bots::BotStrategy::from_label(&body.strategy)
        .ok_or(poker_engine::EngineError::InvalidAction("strategy must be fish, tag, or lag"))?;
    let agent_id = state.manager.add_bot(&id, strategy)?;
    Ok(Json(AgentIdResponse { agent_id }))
}

/// Reads the table's on-chain escrow balance and settles it in full to the
/// caller's wallet, bypassing `GameManager` entirely — this is the
/// last-resort path when a normal `leave` settlement already failed.
async fn emergency_refund<E: EscrowClient>(
    State(state): State<Arc<AppState<E>>>,
    Path(id): Path<String>,
    Json(body): Json<EmergencyRefundBody>,
) -> Result<impl IntoResponse, AppError> {
    match state.escrow.emergency_refund_table(&id).await {
        Ok(refunded) => Ok(Json(EmergencyRefundResponse { refunded })),
        Err(e) => {
            warn!(table_id = %id, wallet = %body.wallet_address, error = %e, "emergency refund failed");
            Err(AppError(poker_engine::EngineError::EscrowFailed(e.to_string())))
        }
    }
}

async fn leaderboard<E: EscrowClient>(State(state): State<Arc<AppState<E>>>) -> impl IntoResponse {
    Json(state.manager.leaderboard())
}
