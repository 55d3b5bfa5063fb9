//! Error kinds named by spec §7. `Validation`/`Unavailable`/
//! `ProtocolTiming` never mutate state before returning. `ExternalTransient`
//! is logged by the caller and never rolls back engine state.
//! `InvariantViolation` is caught by the tick loop's per-table guard.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid action: {0}")]
    InvalidAction(&'static str),
    #[error("amount out of range: {0}")]
    AmountOutOfRange(&'static str),
    #[error("seat {0} is occupied")]
    SeatOccupied(usize),
    #[error("seat {0} does not exist")]
    NoSuchSeat(usize),
    #[error("buy-in {amount} outside allowed range {min}..={max}")]
    BuyInOutOfRange { amount: u64, min: u64, max: u64 },
    #[error("table {0} not found")]
    NoSuchTable(String),
    #[error("agent {0} not found")]
    NoSuchAgent(String),
    #[error("no hand is active at this table")]
    NoActiveHand,
    #[error("seat cannot act: {0}")]
    SeatCannotAct(&'static str),
    #[error("rebuy would exceed the table's max buy-in")]
    RebuyExceedsMax,
    #[error("failed to source cryptographically strong randomness")]
    RandomnessUnavailable,
    #[error("on-chain settlement failed: {0}")]
    EscrowFailed(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl EngineError {
    /// The spec's error-kind taxonomy, used by the HTTP adapter to choose a
    /// status code without the engine knowing about HTTP.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotYourTurn
            | EngineError::InvalidAction(_)
            | EngineError::AmountOutOfRange(_)
            | EngineError::SeatOccupied(_)
            | EngineError::BuyInOutOfRange { .. }
            | EngineError::RebuyExceedsMax => ErrorKind::Validation,
            EngineError::NoSuchSeat(_) | EngineError::NoSuchTable(_) | EngineError::NoSuchAgent(_) => {
                ErrorKind::Unavailable
            }
            EngineError::NoActiveHand | EngineError::SeatCannotAct(_) => ErrorKind::ProtocolTiming,
            EngineError::RandomnessUnavailable | EngineError::EscrowFailed(_) => ErrorKind::ExternalTransient,
            EngineError::InvariantViolation(_) => ErrorKind::InvariantViolation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unavailable,
    ProtocolTiming,
    ExternalTransient,
    InvariantViolation,
}

pub type EngineResult<T> = Result<T, EngineError>;
