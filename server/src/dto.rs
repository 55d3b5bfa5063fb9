//! Wire-format request/response bodies for the HTTP surface (spec.md §6).
//! String parsing of the action enum is deliberately confined to this file
//! (`ActionBody::into_action`) — the engine itself only ever dispatches on
//! `poker_engine::Action`'s tagged variants (Design Notes §9).

use poker_engine::{Action, AgentId, EngineError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SitBody {
    pub seat_number: usize,
    pub buy_in_amount: u64,
    pub agent_name: String,
    pub wallet_address: Option<String>,
    pub deposit_tx_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveBody {
    pub agent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub agent_id: String,
    pub action: String,
    pub amount: Option<u64>,
}

impl ActionBody {
    pub fn into_action(&self) -> Result<Action, EngineError> {
        match self.action.as_str() {
            "fold" => Ok(Action::Fold),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call),
            "bet" => Ok(Action::Bet {
                amount: self
                    .amount
                    .ok_or(EngineError::AmountOutOfRange("bet requires an amount"))?,
            }),
            "raise" => Ok(Action::Raise {
                amount: self
                    .amount
                    .ok_or(EngineError::AmountOutOfRange("raise requires an amount"))?,
            }),
            "all-in" | "all_in" | "allin" => Ok(Action::AllIn),
            _ => Err(EngineError::InvalidAction("unrecognized action")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RebuyBody {
    pub agent_id: String,
    pub amount: u64,
}

/// Same shape as `ActionBody` minus `agent_id` — authenticated agent
/// endpoints resolve the agent from the bearer key, not the request body.
#[derive(Debug, Deserialize)]
pub struct AgentActionBody {
    pub action: String,
    pub amount: Option<u64>,
}

impl AgentActionBody {
    pub fn into_action(&self) -> Result<Action, EngineError> {
        ActionBody {
            agent_id: String::new(),
            action: self.action.clone(),
            amount: self.amount,
        }
        .into_action()
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentRebuyBody {
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct AddBotBody {
    pub strategy: String,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyRefundBody {
    pub wallet_address: String,
}

#[derive(Debug, Serialize)]
pub struct AgentIdResponse {
    pub agent_id: AgentId,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub cash_out: u64,
    pub wallet_address: Option<String>,
    pub settlement_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmergencyRefundResponse {
    pub refunded: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
