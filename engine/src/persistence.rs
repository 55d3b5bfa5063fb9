//! The durable hand-history store. Spec §4.6/§9: the core consumes it
//! through two narrow methods plus a fire-and-forget chip-transaction log,
//! and the fire-and-forget pattern is made an explicit bounded queue so a
//! slow database can't grow memory without limit (Design Notes §9).

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::mpsc;
use tracing::warn;

use crate::agent::AgentId;
use crate::hand::HandState;
use crate::table::Seat;

/// One seat's state at hand completion, handed to the store alongside the
/// hand itself so it can record `hand_players` rows.
#[derive(Debug, Clone)]
pub struct SeatSnapshot {
    pub seat_number: usize,
    pub agent_id: Option<AgentId>,
    pub starting_stack: u64,
    pub ending_stack: u64,
}

impl SeatSnapshot {
    pub fn from_seats(seats: &[Seat], hand: &HandState) -> Vec<Self> {
        seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.agent_id.is_some())
            .map(|(i, s)| SeatSnapshot {
                seat_number: i,
                agent_id: s.agent_id.clone(),
                starting_stack: hand.starting_stack_of(i),
                ending_stack: s.stack,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipTxKind {
    BuyIn,
    CashOut,
    Rebuy,
    PotWin,
}

#[derive(Debug, Clone)]
pub struct ChipTx {
    pub table_id: String,
    pub agent_id: AgentId,
    pub kind: ChipTxKind,
    pub amount: u64,
    pub at_millis: u64,
}

/// Error surfaced by a store implementation. Always "external-transient"
/// per spec §7: the in-memory engine is the authoritative record and is
/// never rolled back because a persistence call failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("persistence call failed: {0}")]
pub struct PersistenceError(pub String);

/// Written as explicit return-position-`impl Future + Send` methods rather
/// than plain `async fn`s: `PersistenceQueue::spawn` below awaits these on a
/// generic `S: PersistenceStore + 'static` inside `tokio::spawn`, which needs
/// a provably `Send` future, and a bare `async fn` in a trait gives an opaque
/// future whose `Send`-ness can't be proven for a type parameter. Impls can
/// still just write `async fn` bodies — the desugared future only needs to
/// satisfy this explicit bound, which it does as long as nothing held across
/// an `.await` in the body is itself non-`Send`.
pub trait PersistenceStore: Send + Sync {
    /// Read at startup to recover the highest persisted `hand_number` per
    /// table, so `GameManager`'s counters continue monotonically instead of
    /// restarting from zero.
    fn get_max_hand_numbers(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, u64>, PersistenceError>> + Send;

    fn persist_completed_hand(
        &self,
        table_id: &str,
        hand: &HandState,
        seats: &[SeatSnapshot],
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn persist_chip_tx(&self, tx: &ChipTx) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

enum WorkItem {
    CompletedHand {
        table_id: String,
        hand: Box<HandState>,
        seats: Vec<SeatSnapshot>,
    },
    ChipTx(ChipTx),
}

/// Bounded fire-and-forget work queue in front of a `PersistenceStore`.
/// `GameManager` pushes onto this from inside the table lock (cheap, never
/// awaits); a background task drains it against the real store. When the
/// queue is full, the oldest pending write is dropped and a `warn!` is
/// logged — back-pressure onto the ticker would defeat the point of taking
/// persistence I/O off the hot path.
pub struct PersistenceQueue {
    tx: mpsc::Sender<WorkItem>,
}

impl PersistenceQueue {
    /// Spawns the background drain task against `store` with a queue of
    /// `capacity` pending writes.
    pub fn spawn<S: PersistenceStore + 'static>(store: S, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel(capacity);
        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                match item {
                    WorkItem::CompletedHand { table_id, hand, seats } => {
                        if let Err(e) = store.persist_completed_hand(&table_id, &hand, &seats).await {
                            warn!(table_id = %table_id, error = %e, "failed to persist completed hand");
                        }
                    }
                    WorkItem::ChipTx(tx) => {
                        if let Err(e) = store.persist_chip_tx(&tx).await {
                            warn!(table_id = %tx.table_id, error = %e, "failed to persist chip transaction");
                        }
                    }
                }
            }
        });
        Self { tx }
    }

    /// Enqueues a completed hand for persistence. Never blocks: if the
    /// queue is full this drops the item and logs instead of waiting,
    /// matching the bounded-queue policy in Design Notes §9.
    pub fn enqueue_completed_hand(&self, table_id: String, hand: HandState, seats: Vec<SeatSnapshot>) {
        let item = WorkItem::CompletedHand {
            table_id: table_id.clone(),
            hand: Box::new(hand),
            seats,
        };
        if self.tx.try_send(item).is_err() {
            warn!(table_id = %table_id, "persistence queue full, dropping completed-hand record");
        }
    }

    pub fn enqueue_chip_tx(&self, tx: ChipTx) {
        let table_id = tx.table_id.clone();
        if self.tx.try_send(WorkItem::ChipTx(tx)).is_err() {
            warn!(table_id = %table_id, "persistence queue full, dropping chip transaction record");
        }
    }
}

/// Deterministic in-memory store for tests: records everything it's handed
/// and never fails, so tests can assert on what the queue drained.
#[derive(Default)]
pub struct InMemoryStore {
    pub max_hand_numbers: std::sync::Mutex<HashMap<String, u64>>,
    pub completed_hands: std::sync::Mutex<Vec<(String, u64)>>,
    pub chip_txs: std::sync::Mutex<Vec<ChipTx>>,
}

impl PersistenceStore for InMemoryStore {
    async fn get_max_hand_numbers(&self) -> Result<HashMap<String, u64>, PersistenceError> {
        Ok(self.max_hand_numbers.lock().expect("poisoned").clone())
    }

    async fn persist_completed_hand(
        &self,
        table_id: &str,
        hand: &HandState,
        _seats: &[SeatSnapshot],
    ) -> Result<(), PersistenceError> {
        self.completed_hands
            .lock()
            .expect("poisoned")
            .push((table_id.to_string(), hand.hand_number));
        Ok(())
    }

    async fn persist_chip_tx(&self, tx: &ChipTx) -> Result<(), PersistenceError> {
        self.chip_txs.lock().expect("poisoned").push(tx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_records_completed_hands() {
        let store = InMemoryStore::default();
        store
            .max_hand_numbers
            .lock()
            .unwrap()
            .insert("micro".to_string(), 5);
        let recovered = store.get_max_hand_numbers().await.unwrap();
        assert_eq!(recovered.get("micro"), Some(&5));
    }
}
