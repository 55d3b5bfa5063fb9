//! The action dispatch is a closed, tagged enum — never string-parsed in
//! the engine. String parsing belongs at the HTTP boundary only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet { amount: u64 },
    Raise { amount: u64 },
    AllIn,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call => "call",
            Action::Bet { .. } => "bet",
            Action::Raise { .. } => "raise",
            Action::AllIn => "all-in",
        }
    }
}

/// One entry in a hand's append-only audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat_number: usize,
    pub action: Action,
    /// The seat's total committed-this-round amount after the action, not
    /// just the delta, so replaying the log reconstructs round state.
    pub round_total_after: u64,
    pub at_millis: u64,
}
