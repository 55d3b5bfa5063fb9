//! Agent identity and lifetime statistics. An `Agent` is the durable
//! record behind a seated bot or human-operated API key; `AgentId` is
//! stable across sittings, rebuys, and table moves.

use serde::{Deserialize, Serialize};

use crate::bots::BotStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Human,
    Bot(BotStrategy),
}

/// Lifetime counters tracked across every table the agent has ever sat at.
/// `net_profit` is signed because an agent can be a net loser over its
/// lifetime; it is never used to gate any engine behavior, only reporting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgentStats {
    pub hands_played: u64,
    pub hands_won: u64,
    pub net_profit: i64,
}

impl AgentStats {
    pub fn record_hand(&mut self, won: bool, profit_delta: i64) {
        self.hands_played += 1;
        if won {
            self.hands_won += 1;
        }
        self.net_profit += profit_delta;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub display_name: String,
    pub kind: AgentKind,
    pub stats: AgentStats,
    /// Present only for agents backed by an on-chain wallet; `None` for
    /// bots and for human agents who have not linked one.
    pub wallet_address: Option<String>,
}

impl Agent {
    pub fn new_human(id: AgentId, display_name: impl Into<String>, wallet_address: Option<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            kind: AgentKind::Human,
            stats: AgentStats::default(),
            wallet_address,
        }
    }

    pub fn new_bot(id: AgentId, display_name: impl Into<String>, strategy: BotStrategy) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            kind: AgentKind::Bot(strategy),
            stats: AgentStats::default(),
            wallet_address: None,
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.kind, AgentKind::Bot(_))
    }
}
