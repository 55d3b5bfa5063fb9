//! Supplementary `GET /tables/{id}/ws` WebSocket feed: pushes a
//! `TableSnapshot` event whenever the rendered table view changes. This is
//! additive observability in the teacher's `ServerEvent` style (SPEC_FULL.md
//! §6) — it is never the only way to mutate state; every mutation still
//! goes through the REST handlers in `routes.rs`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Serialize;

use poker_engine::escrow::EscrowClient;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerEvent<'a> {
    TableSnapshot { table: &'a poker_engine::TableView },
    TableNotFound,
}

pub async fn ws_handler<E: EscrowClient + Send + Sync + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<E>>>,
    Path(table_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_table(socket, state, table_id))
}

/// Polls the rendered view on a short interval and sends it only when the
/// serialized snapshot changes, rather than wiring a broadcast channel
/// through `GameManager` — the engine stays free of any notion of
/// observers (spec.md §1: the web UI is an external collaborator).
async fn stream_table<E: EscrowClient>(mut socket: WebSocket, state: Arc<AppState<E>>, table_id: String) {
    let mut last_sent: Option<String> = None;
    loop {
        let event = match state.manager.get_table(&table_id, None) {
            Ok(view) => serde_json::to_string(&ServerEvent::TableSnapshot { table: &view }),
            Err(_) => serde_json::to_string(&ServerEvent::TableNotFound),
        };
        let Ok(payload) = event else { break };
        if last_sent.as_deref() != Some(payload.as_str()) {
            if socket.send(Message::Text(payload.clone())).await.is_err() {
                break;
            }
            last_sent = Some(payload);
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}
