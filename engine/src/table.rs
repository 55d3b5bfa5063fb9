//! Table and seat lifecycle: seating, removal, clockwise ordering, and
//! dealer rotation. A `Table` exclusively owns its seats and its current
//! hand; the hand manager (`crate::hand`) mutates a hand in place.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::cards::Card;
use crate::error::{EngineError, EngineResult};
use crate::hand::HandState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub id: String,
    pub name: String,
    pub small_blind: u64,
    pub big_blind: u64,
    pub min_buy_in: u64,
    pub max_buy_in: u64,
    pub max_seats: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub agent_id: Option<AgentId>,
    pub stack: u64,
    pub buy_in: u64,
    pub hole_cards: Option<(Card, Card)>,
    pub current_bet: u64,
    pub is_sitting_out: bool,
    pub has_acted: bool,
    pub has_folded: bool,
    pub is_all_in: bool,
}

impl Seat {
    pub fn empty() -> Self {
        Self {
            agent_id: None,
            stack: 0,
            buy_in: 0,
            hole_cards: None,
            current_bet: 0,
            is_sitting_out: false,
            has_acted: false,
            has_folded: false,
            is_all_in: false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.agent_id.is_some()
    }

    pub fn is_active_for_hand(&self) -> bool {
        self.is_occupied() && !self.is_sitting_out
    }

    /// Resets the per-hand flags a new hand deals over; preserves stack,
    /// buy-in, and occupancy.
    fn reset_for_new_hand(&mut self) {
        self.hole_cards = None;
        self.current_bet = 0;
        self.has_acted = false;
        self.has_folded = false;
        self.is_all_in = false;
    }
}

/// Archived hand history is capped to this many entries per table (ring
/// buffer semantics: oldest drops first).
pub const MAX_HAND_HISTORY: usize = 50;

#[derive(Debug, Clone)]
pub struct Table {
    pub config: TableConfig,
    pub seats: Vec<Seat>,
    pub current_hand: Option<HandState>,
    pub hand_history: std::collections::VecDeque<HandState>,
    pub hand_count: u64,
    pub dealer_seat: Option<usize>,
    /// Seats whose agent called `LeaveAgent` mid-hand. The seat is
    /// force-folded immediately but its chips stay put (and keep counting
    /// toward chip conservation) until the hand completes, since pulling a
    /// seat's cards out from under an in-progress showdown would break
    /// side-pot accounting. Drained by the game manager after
    /// `CompleteShowdown`.
    pub pending_leaves: std::collections::HashSet<usize>,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        let max_seats = config.max_seats;
        Self {
            config,
            seats: (0..max_seats).map(|_| Seat::empty()).collect(),
            current_hand: None,
            hand_history: std::collections::VecDeque::with_capacity(MAX_HAND_HISTORY),
            hand_count: 0,
            dealer_seat: None,
            pending_leaves: std::collections::HashSet::new(),
        }
    }

    pub fn active_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_active_for_hand()).count()
    }

    pub fn seat_agent(
        &mut self,
        seat_number: usize,
        agent_id: AgentId,
        buy_in: u64,
        start_sitting_out: bool,
    ) -> EngineResult<()> {
        let seat = self
            .seats
            .get_mut(seat_number)
            .ok_or(EngineError::NoSuchSeat(seat_number))?;
        if seat.is_occupied() {
            return Err(EngineError::SeatOccupied(seat_number));
        }
        if buy_in < self.config.min_buy_in || buy_in > self.config.max_buy_in {
            return Err(EngineError::BuyInOutOfRange {
                amount: buy_in,
                min: self.config.min_buy_in,
                max: self.config.max_buy_in,
            });
        }
        *seat = Seat::empty();
        seat.agent_id = Some(agent_id);
        seat.stack = buy_in;
        seat.buy_in = buy_in;
        seat.is_sitting_out = start_sitting_out;
        Ok(())
    }

    /// Removes the agent from `seat_number`, returning its id and the
    /// seat's final stack for profit accounting and escrow settlement.
    pub fn remove_agent(&mut self, seat_number: usize) -> EngineResult<(AgentId, u64)> {
        let seat = self
            .seats
            .get_mut(seat_number)
            .ok_or(EngineError::NoSuchSeat(seat_number))?;
        let agent_id = seat.agent_id.take().ok_or(EngineError::NoSuchSeat(seat_number))?;
        let stack = seat.stack;
        *seat = Seat::empty();
        Ok((agent_id, stack))
    }

    pub fn find_seat(&self, agent_id: &AgentId) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.agent_id.as_ref() == Some(agent_id))
    }

    /// Next occupied, not-sitting-out seat clockwise of `after`, wrapping.
    /// Returns `None` if no seat qualifies (including `after` itself).
    pub fn next_active_seat(&self, after: usize) -> Option<usize> {
        let n = self.seats.len();
        if n == 0 {
            return None;
        }
        for step in 1..=n {
            let idx = (after + step) % n;
            if self.seats[idx].is_active_for_hand() {
                return Some(idx);
            }
        }
        None
    }

    pub fn advance_dealer_button(&mut self) {
        let start = self.dealer_seat.unwrap_or(self.seats.len().saturating_sub(1));
        self.dealer_seat = self.next_active_seat(start).or(self.dealer_seat);
    }

    pub(crate) fn reset_seats_for_new_hand(&mut self) {
        for seat in &mut self.seats {
            if seat.is_occupied() {
                seat.reset_for_new_hand();
            }
        }
    }
}
