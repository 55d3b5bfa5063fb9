//! Agent bearer-key authentication (spec.md §6): requests carry a
//! `pa_sk_`-prefixed API key, the server hashes it with SHA-256, and
//! compares against stored hashes to resolve the agent. Grounded on
//! `krukah-robopoker`'s `rbp-auth` `Crypto::hash` (SHA-256 digest of a raw
//! token) — generalized here from its JWT-session lookup into a plain
//! hash-keyed map, since spec.md's agent-auth contract is a static API key,
//! not a session token.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use rand::Rng;
use sha2::{Digest, Sha256};

use poker_engine::escrow::EscrowClient;
use poker_engine::AgentId;

use crate::state::AppState;

const KEY_PREFIX: &str = "pa_sk_";

fn hash_key(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Maps a SHA-256 hash of a raw API key to the agent it authenticates.
/// Raw keys are never retained — only the hash, per spec.md §6.
#[derive(Default)]
pub struct ApiKeyStore {
    hashes: RwLock<HashMap<String, AgentId>>,
}

impl ApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh `pa_sk_`-prefixed key for `agent_id`, stores its hash,
    /// and returns the raw key — the only time the caller will ever see it.
    pub fn issue(&self, agent_id: AgentId) -> String {
        let suffix: String = (0..32)
            .map(|_| {
                let idx = rand::rng().random_range(0..62);
                char_at(idx)
            })
            .collect();
        let raw = format!("{KEY_PREFIX}{suffix}");
        self.hashes.write().expect("api key store poisoned").insert(hash_key(&raw), agent_id);
        raw
    }

    pub fn resolve(&self, raw_key: &str) -> Option<AgentId> {
        self.hashes.read().expect("api key store poisoned").get(&hash_key(raw_key)).cloned()
    }
}

fn char_at(idx: u32) -> char {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    ALPHABET[idx as usize] as char
}

/// Extractor for an authenticated agent endpoint. Rejects with 401 when the
/// `Authorization: Bearer pa_sk_...` header is missing, malformed, or the
/// key hash has no matching agent.
pub struct AgentAuth(pub AgentId);

impl<E: EscrowClient + 'static> FromRequestParts<Arc<AppState<E>>> for AgentAuth {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState<E>>) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing authorization header"))?;
        let raw_key = header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "expected a bearer token"))?;
        if !raw_key.starts_with(KEY_PREFIX) {
            return Err((StatusCode::UNAUTHORIZED, "malformed agent api key"));
        }
        state
            .api_keys
            .resolve(raw_key)
            .map(AgentAuth)
            .ok_or((StatusCode::UNAUTHORIZED, "unknown agent api key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_key_resolves_back_to_its_agent() {
        let store = ApiKeyStore::new();
        let raw = store.issue(AgentId::new("human-1"));
        assert!(raw.starts_with(KEY_PREFIX));
        assert_eq!(store.resolve(&raw), Some(AgentId::new("human-1")));
    }

    #[test]
    fn unknown_key_does_not_resolve() {
        let store = ApiKeyStore::new();
        store.issue(AgentId::new("human-1"));
        assert_eq!(store.resolve("pa_sk_not_a_real_key"), None);
    }
}
