//! The engine's narrow boundary with the on-chain escrow custody contract.
//! Spec §4.7/§9: a four-method interface, not a chain SDK. The engine never
//! calls this itself — `GameManager::sit_agent`/`leave_agent` return the
//! amounts the `server` crate's HTTP handlers pass through to whatever
//! `EscrowClient` they're wired with. Tests use the in-memory mock below.

use std::collections::HashMap;
use std::sync::Mutex;

/// Error surfaced when an on-chain call fails. Spec §7 calls this an
/// "external-transient" failure: the engine's in-memory state is never
/// rolled back because of it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("on-chain settlement failed: {0}")]
pub struct EscrowError(pub String);

/// Native `async fn` in a trait (edition 2024, no extra crate needed).
/// Consumed generically (`impl EscrowClient`) by the `server` crate rather
/// than boxed as `dyn`, since the async-fn-in-trait desugaring isn't
/// object-safe.
pub trait EscrowClient: Send + Sync {
    /// Pulls `amount` chips from `player_addr`'s wallet into the table's
    /// escrow account ahead of a sit.
    async fn deposit(&self, table_id: &str, player_addr: &str, amount: u64) -> Result<(), EscrowError>;

    /// Settles `final_stack` chips from the table's escrow back to
    /// `player_addr`'s wallet on departure.
    async fn settle(&self, table_id: &str, player_addr: &str, final_stack: u64) -> Result<(), EscrowError>;

    /// Settles many players at once, e.g. when a table is torn down.
    async fn batch_settle(&self, table_id: &str, settlements: &[(String, u64)]) -> Result<(), EscrowError>;

    /// Reads the table's on-chain escrow balance and refunds it in full,
    /// used by the emergency-refund affordance when a normal settle fails.
    async fn emergency_refund_table(&self, table_id: &str) -> Result<u64, EscrowError>;
}

/// Deterministic in-memory mock used by tests and, until a real chain
/// client is wired in `server`, by the process itself. Tracks escrowed
/// balances per `(table_id, player_addr)` so deposit/settle stay consistent
/// with each other within a test.
#[derive(Debug, Default)]
pub struct MockEscrowClient {
    balances: Mutex<HashMap<(String, String), u64>>,
}

impl MockEscrowClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, table_id: &str, player_addr: &str) -> u64 {
        let balances = self.balances.lock().expect("escrow mock mutex poisoned");
        balances
            .get(&(table_id.to_string(), player_addr.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl EscrowClient for MockEscrowClient {
    async fn deposit(&self, table_id: &str, player_addr: &str, amount: u64) -> Result<(), EscrowError> {
        let mut balances = self.balances.lock().expect("escrow mock mutex poisoned");
        *balances
            .entry((table_id.to_string(), player_addr.to_string()))
            .or_insert(0) += amount;
        Ok(())
    }

    async fn settle(&self, table_id: &str, player_addr: &str, final_stack: u64) -> Result<(), EscrowError> {
        let mut balances = self.balances.lock().expect("escrow mock mutex poisoned");
        let key = (table_id.to_string(), player_addr.to_string());
        let escrowed = balances.get(&key).copied().unwrap_or(0);
        if final_stack > escrowed {
            return Err(EscrowError(format!(
                "settle {final_stack} exceeds escrowed balance {escrowed} for {player_addr}"
            )));
        }
        balances.insert(key, escrowed - final_stack);
        Ok(())
    }

    async fn batch_settle(&self, table_id: &str, settlements: &[(String, u64)]) -> Result<(), EscrowError> {
        for (addr, amount) in settlements {
            self.settle(table_id, addr, *amount).await?;
        }
        Ok(())
    }

    async fn emergency_refund_table(&self, table_id: &str) -> Result<u64, EscrowError> {
        let mut balances = self.balances.lock().expect("escrow mock mutex poisoned");
        let mut total = 0u64;
        for (key, bal) in balances.iter_mut() {
            if key.0 == table_id {
                total += *bal;
                *bal = 0;
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deposit_then_settle_zeroes_balance() {
        let client = MockEscrowClient::new();
        client.deposit("micro", "0xabc", 100).await.unwrap();
        assert_eq!(client.balance_of("micro", "0xabc"), 100);
        client.settle("micro", "0xabc", 100).await.unwrap();
        assert_eq!(client.balance_of("micro", "0xabc"), 0);
    }

    #[tokio::test]
    async fn settle_beyond_escrowed_balance_fails() {
        let client = MockEscrowClient::new();
        client.deposit("micro", "0xabc", 50).await.unwrap();
        assert!(client.settle("micro", "0xabc", 51).await.is_err());
    }
}
