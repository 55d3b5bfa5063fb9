//! Process-wide `AppState`: the `GameManager`, the escrow collaborator, and
//! the agent API-key store. One value, shared behind `Arc` between the axum
//! router and the background ticker task, matching Design Notes §9's
//! explicit-value model rather than a process singleton.
//!
//! Generic over the escrow client type rather than `Arc<dyn EscrowClient>`:
//! `EscrowClient`'s methods are native `async fn`s (edition 2024), and that
//! trait shape is not dyn-compatible — the engine crate's own doc comment on
//! `EscrowClient` calls for `impl EscrowClient` callers, not boxed trait
//! objects, so the server is generic over `E` instead.

use std::sync::Arc;

use poker_engine::escrow::EscrowClient;
use poker_engine::GameManager;

use crate::auth::ApiKeyStore;

pub struct AppState<E: EscrowClient> {
    pub manager: Arc<GameManager>,
    pub escrow: E,
    pub api_keys: ApiKeyStore,
}
