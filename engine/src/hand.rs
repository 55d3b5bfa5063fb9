//! The per-hand state machine: blinds, dealing, betting rounds, side pots,
//! and showdown. This is the heart of the engine; `Table` owns at most one
//! live `HandState` at a time and the tick loop drives it forward.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionRecord};
use crate::agent::AgentId;
use crate::cards::{Card, Deck};
use crate::error::{EngineError, EngineResult};
use crate::eval::evaluate;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u64,
    pub eligible_seats: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Winner {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub seat_number: usize,
    pub amount: u64,
    pub hand_name: String,
}

/// The fields the public view of a hand must never expose: the private
/// deck and the per-seat starting stacks used to compute unrealized P/L.
/// Kept as a distinct record rather than opaque fields on `HandState` so a
/// DTO layer built by field-copying can't accidentally leak them.
#[derive(Debug, Clone)]
pub struct HandPrivateState {
    pub deck: Deck,
    pub starting_stacks: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct HandState {
    pub id: String,
    pub hand_number: u64,
    pub phase: Phase,
    pub community_cards: Vec<Card>,
    pub pot: u64,
    pub side_pots: Vec<SidePot>,
    pub actions: Vec<ActionRecord>,
    pub current_betting_round: Phase,
    pub active_player_order: Vec<usize>,
    pub current_player_index: usize,
    pub dealer_seat_number: usize,
    pub small_blind_seat_number: usize,
    pub big_blind_seat_number: usize,
    pub current_bet: u64,
    pub min_raise: u64,
    pub winners: Vec<Winner>,
    pub started_at: u64,
    pub completed_at: Option<u64>,
    pub last_action_at: u64,
    /// Total chips each seat has committed this hand, across all rounds.
    /// Indexed by seat number; reset per-round `Seat::current_bet` is a
    /// different quantity from this running total.
    pub contributions: Vec<u64>,
    pub(crate) private: HandPrivateState,
}

/// A lookup from agent id to display name, supplied by the game manager's
/// registry. The hand state machine never owns agent identity itself.
pub type NameLookup<'a> = &'a dyn Fn(&AgentId) -> String;

impl HandState {
    /// Starts a new hand at `table`. Requires at least two active seats.
    /// Advances the dealer button, posts blinds, deals hole cards, and
    /// builds the preflop action order. If the blinds leave at most one
    /// seat able to act, runs the board out immediately.
    pub fn start(
        table: &mut Table,
        hand_number: u64,
        id: impl Into<String>,
        now_millis: u64,
        name_of: NameLookup,
    ) -> EngineResult<Self> {
        if table.active_seat_count() < 2 {
            return Err(EngineError::InvariantViolation(
                "start_hand requires at least 2 active seats",
            ));
        }

        table.reset_seats_for_new_hand();

        if table.dealer_seat.is_none() {
            let first = table
                .seats
                .iter()
                .position(|s| s.is_active_for_hand())
                .expect("active_seat_count checked above");
            table.dealer_seat = Some(first);
        } else {
            table.advance_dealer_button();
        }
        let dealer = table.dealer_seat.expect("set above");

        let active_count = table.active_seat_count();
        let (sb_seat, bb_seat) = if active_count == 2 {
            let bb = table
                .next_active_seat(dealer)
                .expect("heads-up has a second active seat");
            (dealer, bb)
        } else {
            let sb = table
                .next_active_seat(dealer)
                .expect("active_seat_count >= 2");
            let bb = table
                .next_active_seat(sb)
                .expect("active_seat_count >= 3 or wraps to dealer");
            (sb, bb)
        };

        let mut deck = Deck::shuffled().map_err(|_| EngineError::RandomnessUnavailable)?;

        let starting_stacks: Vec<u64> = table.seats.iter().map(|s| s.stack).collect();
        let mut contributions = vec![0u64; table.seats.len()];

        let active_seats: Vec<usize> = table
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_active_for_hand())
            .map(|(i, _)| i)
            .collect();

        let mut first_card = HashMap::new();
        for &seat in &active_seats {
            let card = deck
                .draw()
                .ok_or(EngineError::InvariantViolation("deck exhausted dealing hole cards"))?;
            first_card.insert(seat, card);
        }
        for &seat in &active_seats {
            let second = deck
                .draw()
                .ok_or(EngineError::InvariantViolation("deck exhausted dealing hole cards"))?;
            table.seats[seat].hole_cards = Some((first_card[&seat], second));
        }

        let small_blind = table.config.small_blind;
        let big_blind = table.config.big_blind;

        let sb_posted = post_blind(table, sb_seat, small_blind, &mut contributions);
        let bb_posted = post_blind(table, bb_seat, big_blind, &mut contributions);
        let pot = sb_posted + bb_posted;

        let order = rotate_from(&active_seats, bb_seat);

        let mut hand = HandState {
            id: id.into(),
            hand_number,
            phase: Phase::Preflop,
            community_cards: Vec::new(),
            pot,
            side_pots: Vec::new(),
            actions: Vec::new(),
            current_betting_round: Phase::Preflop,
            active_player_order: order,
            current_player_index: 0,
            dealer_seat_number: dealer,
            small_blind_seat_number: sb_seat,
            big_blind_seat_number: bb_seat,
            // The facing bet is the nominal big blind even when a short
            // stack's post falls short of it (that seat is already all-in,
            // so `round_is_complete` never needs it to match `current_bet`
            // directly) — other callers still owe the full big blind.
            current_bet: big_blind,
            min_raise: big_blind,
            winners: Vec::new(),
            started_at: now_millis,
            completed_at: None,
            last_action_at: now_millis,
            contributions,
            private: HandPrivateState {
                deck,
                starting_stacks,
            },
        };

        hand.seek_to_actionable(table);
        if hand.actionable_count(table) <= 1 {
            hand.run_out_and_resolve(table, now_millis, name_of)?;
        }
        Ok(hand)
    }

    pub fn current_turn_seat(&self) -> Option<usize> {
        if matches!(self.phase, Phase::Showdown | Phase::Complete) {
            return None;
        }
        self.active_player_order.get(self.current_player_index).copied()
    }

    /// Validates and applies one action from `seat_number`. Advances the
    /// round or the hand as far as the new state allows without further
    /// input (e.g. running the board out when everyone left is all-in).
    pub fn process_action(
        &mut self,
        table: &mut Table,
        seat_number: usize,
        action: Action,
        now_millis: u64,
        name_of: NameLookup,
    ) -> EngineResult<()> {
        if matches!(self.phase, Phase::Showdown | Phase::Complete) {
            return Err(EngineError::NoActiveHand);
        }
        if self.current_turn_seat() != Some(seat_number) {
            return Err(EngineError::NotYourTurn);
        }
        {
            let seat = &table.seats[seat_number];
            if seat.has_folded || seat.is_all_in {
                return Err(EngineError::SeatCannotAct("seat has already folded or is all-in"));
            }
        }

        // Preflop, a bare "bet" is a raise: the big blind is an outstanding bet.
        let action = if self.phase == Phase::Preflop {
            if let Action::Bet { amount } = action {
                Action::Raise { amount }
            } else {
                action
            }
        } else {
            action
        };

        self.apply_action(table, seat_number, action)?;

        self.last_action_at = now_millis;
        table.seats[seat_number].has_acted = true;
        let round_total_after = table.seats[seat_number].current_bet;
        self.actions.push(ActionRecord {
            seat_number,
            action,
            round_total_after,
            at_millis: now_millis,
        });

        let remaining: Vec<usize> = (0..table.seats.len())
            .filter(|&i| table.seats[i].is_active_for_hand() && !table.seats[i].has_folded)
            .collect();
        if remaining.len() == 1 {
            self.award_uncontested(table, remaining[0], now_millis, name_of);
            return Ok(());
        }

        self.seek_to_actionable(table);
        if self.round_is_complete(table) {
            self.advance_round(table, now_millis, name_of)?;
        }
        Ok(())
    }

    /// Folds `seat_number` regardless of whose turn it is, for a player
    /// leaving mid-hand (spec §4.6 `LeaveAgent`). A no-op if the seat has
    /// already folded or is all-in (its chips are already locked in).
    pub fn force_fold(&mut self, table: &mut Table, seat_number: usize, now_millis: u64, name_of: NameLookup) -> EngineResult<()> {
        if matches!(self.phase, Phase::Showdown | Phase::Complete) {
            return Ok(());
        }
        if table.seats[seat_number].has_folded || table.seats[seat_number].is_all_in {
            return Ok(());
        }
        table.seats[seat_number].has_folded = true;
        table.seats[seat_number].has_acted = true;
        let round_total_after = table.seats[seat_number].current_bet;
        self.actions.push(ActionRecord {
            seat_number,
            action: Action::Fold,
            round_total_after,
            at_millis: now_millis,
        });
        self.last_action_at = now_millis;

        let remaining: Vec<usize> = (0..table.seats.len())
            .filter(|&i| table.seats[i].is_active_for_hand() && !table.seats[i].has_folded)
            .collect();
        if remaining.len() == 1 {
            self.award_uncontested(table, remaining[0], now_millis, name_of);
            return Ok(());
        }

        if self.current_turn_seat() == Some(seat_number) {
            self.seek_to_actionable(table);
        }
        if self.round_is_complete(table) {
            self.advance_round(table, now_millis, name_of)?;
        }
        Ok(())
    }

    fn apply_action(&mut self, table: &mut Table, seat_number: usize, action: Action) -> EngineResult<()> {
        match action {
            Action::Fold => {
                table.seats[seat_number].has_folded = true;
            }
            Action::Check => {
                if table.seats[seat_number].current_bet != self.current_bet {
                    return Err(EngineError::InvalidAction("cannot check facing a bet"));
                }
            }
            Action::Call => {
                let seat = &table.seats[seat_number];
                let to_call = self.current_bet.saturating_sub(seat.current_bet);
                if to_call == 0 {
                    return Err(EngineError::InvalidAction("nothing to call"));
                }
                let amount = to_call.min(seat.stack);
                self.commit_chips(table, seat_number, amount);
            }
            Action::Bet { amount } => {
                if self.phase == Phase::Preflop {
                    return Err(EngineError::InvalidAction("bet is not legal preflop"));
                }
                if self.current_bet != 0 {
                    return Err(EngineError::InvalidAction("cannot bet when a bet is already live"));
                }
                let seat_stack = table.seats[seat_number].stack;
                let is_all_in = amount >= seat_stack;
                let amount = amount.min(seat_stack);
                if !is_all_in && amount < table.config.big_blind {
                    return Err(EngineError::AmountOutOfRange("bet must be at least the big blind"));
                }
                self.commit_chips(table, seat_number, amount);
                self.current_bet = table.seats[seat_number].current_bet;
                self.min_raise = self.current_bet;
                self.reset_others_acted(table, seat_number);
            }
            Action::Raise { amount } => {
                let seat_stack = table.seats[seat_number].stack;
                let already_in = table.seats[seat_number].current_bet;
                let is_all_in = amount >= already_in + seat_stack;
                let target_total = amount.min(already_in + seat_stack);
                if target_total <= self.current_bet {
                    return Err(EngineError::InvalidAction("raise must exceed the current bet"));
                }
                let min_legal = self.current_bet + self.min_raise;
                let raise_size = target_total - self.current_bet;
                if !is_all_in && target_total < min_legal {
                    return Err(EngineError::AmountOutOfRange("raise is smaller than the minimum raise"));
                }
                let delta = target_total - already_in;
                self.commit_chips(table, seat_number, delta);
                self.current_bet = target_total;
                // a short all-in raise below the minimum never reopens action.
                if raise_size >= self.min_raise {
                    self.min_raise = raise_size;
                    self.reset_others_acted(table, seat_number);
                }
            }
            Action::AllIn => {
                let seat = &table.seats[seat_number];
                if seat.stack == 0 {
                    return Err(EngineError::InvalidAction("seat has no chips to push all-in"));
                }
                let already_in = seat.current_bet;
                let stack = seat.stack;
                let target_total = already_in + stack;
                self.commit_chips(table, seat_number, stack);
                if target_total > self.current_bet {
                    let raise_size = target_total - self.current_bet;
                    self.current_bet = target_total;
                    if raise_size >= self.min_raise {
                        self.min_raise = raise_size;
                        self.reset_others_acted(table, seat_number);
                    }
                }
            }
        }
        Ok(())
    }

    fn commit_chips(&mut self, table: &mut Table, seat_number: usize, amount: u64) {
        let seat = &mut table.seats[seat_number];
        seat.stack -= amount;
        seat.current_bet += amount;
        if seat.stack == 0 {
            seat.is_all_in = true;
        }
        self.contributions[seat_number] += amount;
        self.pot += amount;
    }

    fn reset_others_acted(&mut self, table: &mut Table, except: usize) {
        for &seat in &self.active_player_order {
            if seat != except && !table.seats[seat].has_folded && !table.seats[seat].is_all_in {
                table.seats[seat].has_acted = false;
            }
        }
    }

    fn actionable_count(&self, table: &Table) -> usize {
        self.active_player_order
            .iter()
            .filter(|&&s| !table.seats[s].has_folded && !table.seats[s].is_all_in)
            .count()
    }

    fn round_is_complete(&self, table: &Table) -> bool {
        self.active_player_order.iter().all(|&s| {
            let seat = &table.seats[s];
            seat.has_folded || seat.is_all_in || (seat.has_acted && seat.current_bet == self.current_bet)
        })
    }

    /// Moves `current_player_index` forward to the next seat that can still
    /// act, leaving it past the end of the order if no one can.
    fn seek_to_actionable(&mut self, table: &Table) {
        let n = self.active_player_order.len();
        if n == 0 {
            self.current_player_index = n;
            return;
        }
        for step in 0..n {
            let idx = (self.current_player_index + step) % n;
            let seat = self.active_player_order[idx];
            if !table.seats[seat].has_folded && !table.seats[seat].is_all_in {
                self.current_player_index = idx;
                return;
            }
        }
        self.current_player_index = n;
    }

    fn award_uncontested(&mut self, table: &mut Table, seat: usize, now_millis: u64, name_of: NameLookup) {
        let amount = self.pot;
        table.seats[seat].stack += amount;
        let agent_id = table.seats[seat]
            .agent_id
            .clone()
            .expect("uncontested winner seat is occupied");
        self.winners.push(Winner {
            agent_name: name_of(&agent_id),
            agent_id,
            seat_number: seat,
            amount,
            hand_name: "Last player standing".to_string(),
        });
        self.phase = Phase::Showdown;
        self.completed_at = None;
        self.last_action_at = now_millis;
    }

    fn advance_round(&mut self, table: &mut Table, now_millis: u64, name_of: NameLookup) -> EngineResult<()> {
        for seat in &mut table.seats {
            seat.current_bet = 0;
            seat.has_acted = false;
        }
        self.current_bet = 0;
        self.min_raise = table.config.big_blind;

        let next_phase = match self.phase {
            Phase::Preflop => Phase::Flop,
            Phase::Flop => Phase::Turn,
            Phase::Turn => Phase::River,
            Phase::River => Phase::Showdown,
            Phase::Showdown | Phase::Complete => return Ok(()),
        };

        if next_phase == Phase::Showdown {
            return self.enter_showdown(table, now_millis, name_of);
        }

        self.deal_street(next_phase)?;
        self.phase = next_phase;
        self.current_betting_round = next_phase;

        let remaining: Vec<usize> = (0..table.seats.len())
            .filter(|&i| table.seats[i].is_active_for_hand() && !table.seats[i].has_folded)
            .collect();
        // Rotate `remaining` itself rather than asking the table for the next
        // active seat after the dealer: that seat may have folded this hand,
        // and falling back through `rotate_from_inclusive` would silently
        // start the order at the lowest seat number instead of the correct
        // next-still-in seat clockwise of the dealer.
        self.active_player_order = rotate_from(&remaining, self.dealer_seat_number);
        self.current_player_index = 0;
        self.seek_to_actionable(table);

        if self.actionable_count(table) <= 1 {
            return self.run_out_and_resolve(table, now_millis, name_of);
        }
        if self.round_is_complete(table) {
            return self.advance_round(table, now_millis, name_of);
        }
        Ok(())
    }

    fn deal_street(&mut self, phase: Phase) -> EngineResult<()> {
        let n = match phase {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            _ => 0,
        };
        for _ in 0..n {
            let card = self
                .private
                .deck
                .draw()
                .ok_or(EngineError::InvariantViolation("deck exhausted dealing community cards"))?;
            self.community_cards.push(card);
        }
        Ok(())
    }

    /// Deals every remaining community card without waiting for action,
    /// then resolves the showdown. Used when at most one seat can still act.
    fn run_out_and_resolve(&mut self, table: &mut Table, now_millis: u64, name_of: NameLookup) -> EngineResult<()> {
        while self.community_cards.len() < 5 {
            let phase = match self.community_cards.len() {
                0 => Phase::Flop,
                3 | 4 => {
                    if self.community_cards.len() == 3 {
                        Phase::Turn
                    } else {
                        Phase::River
                    }
                }
                _ => break,
            };
            self.deal_street(phase)?;
        }
        self.enter_showdown(table, now_millis, name_of)
    }

    fn enter_showdown(&mut self, table: &mut Table, now_millis: u64, name_of: NameLookup) -> EngineResult<()> {
        self.phase = Phase::Showdown;
        self.side_pots = self.compute_side_pots(table);

        let mut hands: HashMap<usize, crate::eval::EvaluatedHand> = HashMap::new();
        for pot in &self.side_pots {
            for &seat in &pot.eligible_seats {
                if hands.contains_key(&seat) {
                    continue;
                }
                let hole = table.seats[seat].hole_cards.expect("eligible seat has hole cards");
                let mut seven = self.community_cards.clone();
                seven.push(hole.0);
                seven.push(hole.1);
                hands.insert(seat, evaluate(&seven));
            }
        }

        for pot in self.side_pots.clone() {
            let mut best_seats: Vec<usize> = Vec::new();
            for &seat in &pot.eligible_seats {
                let hand = hands.get(&seat).expect("evaluated above");
                best_seats = match best_seats.first() {
                    None => vec![seat],
                    Some(&champ) => {
                        let champ_hand = hands.get(&champ).expect("evaluated above");
                        match crate::eval::EvaluatedHand::compare(hand, champ_hand) {
                            std::cmp::Ordering::Greater => vec![seat],
                            std::cmp::Ordering::Equal => {
                                let mut tied = best_seats.clone();
                                tied.push(seat);
                                tied
                            }
                            std::cmp::Ordering::Less => best_seats.clone(),
                        }
                    }
                };
            }
            let share = pot.amount / best_seats.len() as u64;
            let mut remainder = pot.amount - share * best_seats.len() as u64;
            for &seat in &best_seats {
                let mut amount = share;
                if remainder > 0 {
                    amount += 1;
                    remainder -= 1;
                }
                table.seats[seat].stack += amount;
                let agent_id = table.seats[seat].agent_id.clone().expect("winner seat is occupied");
                let hand_name = hands.get(&seat).expect("evaluated above").name.clone();
                self.winners.push(Winner {
                    agent_name: name_of(&agent_id),
                    agent_id,
                    seat_number: seat,
                    amount,
                    hand_name,
                });
            }
        }

        self.last_action_at = now_millis;
        Ok(())
    }

    fn compute_side_pots(&self, table: &Table) -> Vec<SidePot> {
        let mut levels: Vec<u64> = self.contributions.iter().copied().filter(|&c| c > 0).collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots = Vec::new();
        let mut prev = 0u64;
        let mut carry = 0u64;
        for &level in &levels {
            let contributors = self.contributions.iter().filter(|&&c| c >= level).count() as u64;
            let eligible: Vec<usize> = (0..table.seats.len())
                .filter(|&i| self.contributions[i] >= level && !table.seats[i].has_folded)
                .collect();
            let amount = carry + (level - prev) * contributors;
            if eligible.is_empty() {
                carry = amount;
            } else {
                pots.push(SidePot { amount, eligible_seats: eligible });
                carry = 0;
            }
            prev = level;
        }
        if carry > 0 {
            if let Some(last) = pots.last_mut() {
                last.amount += carry;
            } else {
                pots.push(SidePot { amount: carry, eligible_seats: Vec::new() });
            }
        }
        pots
    }

    /// Called by the tick loop once the showdown display hold has elapsed.
    /// Finalizes per-agent counters for the caller to apply and marks the
    /// hand complete; the caller (game manager) clears `table.current_hand`.
    pub fn complete(&mut self, now_millis: u64) {
        self.phase = Phase::Complete;
        self.completed_at = Some(now_millis);
    }

    pub fn starting_stack_of(&self, seat: usize) -> u64 {
        self.private.starting_stacks.get(seat).copied().unwrap_or(0)
    }
}

fn post_blind(table: &mut Table, seat: usize, amount: u64, contributions: &mut [u64]) -> u64 {
    let s = &mut table.seats[seat];
    let posted = amount.min(s.stack);
    s.stack -= posted;
    s.current_bet = posted;
    if s.stack == 0 {
        s.is_all_in = true;
    }
    contributions[seat] += posted;
    posted
}

/// Rotates `seats` (ascending seat numbers) so the first entry is the first
/// one strictly greater than `after`, wrapping to the smallest if none is.
fn rotate_from(seats: &[usize], after: usize) -> Vec<usize> {
    if seats.is_empty() {
        return Vec::new();
    }
    let start_pos = seats.iter().position(|&s| s > after).unwrap_or(0);
    let n = seats.len();
    (0..n).map(|i| seats[(start_pos + i) % n]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};
    use crate::table::TableConfig;

    fn table_with_seats(n: usize, stack: u64) -> Table {
        let cfg = TableConfig {
            id: "t1".into(),
            name: "Test".into(),
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 40,
            max_buy_in: 200,
            max_seats: n,
        };
        let mut table = Table::new(cfg);
        for i in 0..n {
            table
                .seat_agent(i, AgentId::new(format!("a{i}")), stack, false)
                .unwrap();
        }
        table
    }

    fn name_of(id: &AgentId) -> String {
        id.0.clone()
    }

    #[test]
    fn heads_up_dealer_is_small_blind() {
        let mut table = table_with_seats(2, 100);
        let hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();
        assert_eq!(hand.dealer_seat_number, hand.small_blind_seat_number);
        assert_eq!(hand.active_player_order.first(), Some(&hand.dealer_seat_number));
        assert_eq!(hand.active_player_order.last(), Some(&hand.big_blind_seat_number));
    }

    #[test]
    fn blinds_are_posted_and_pot_seeded() {
        let mut table = table_with_seats(3, 100);
        let hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();
        assert_eq!(hand.pot, 3);
        assert_eq!(hand.current_bet, 2);
        assert_eq!(hand.min_raise, 2);
    }

    #[test]
    fn fold_out_awards_whole_pot() {
        let mut table = table_with_seats(3, 100);
        let mut hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();
        let first = hand.current_turn_seat().unwrap();
        hand.process_action(&mut table, first, Action::Fold, 1, &name_of).unwrap();
        let second = hand.current_turn_seat().unwrap();
        hand.process_action(&mut table, second, Action::Fold, 2, &name_of).unwrap();
        assert_eq!(hand.phase, Phase::Showdown);
        assert_eq!(hand.winners.len(), 1);
        assert_eq!(hand.winners[0].hand_name, "Last player standing");
        assert_eq!(hand.winners[0].amount, 3);
    }

    #[test]
    fn short_all_in_does_not_reopen_action() {
        let mut table = table_with_seats(3, 100);
        table.seats[2].stack = 1;
        let mut hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();
        table.seats[2].stack = 1;
        let min_raise_before = hand.min_raise;
        let utg = hand.current_turn_seat().unwrap();
        hand.process_action(&mut table, utg, Action::Call, 1, &name_of).unwrap();
        assert_eq!(hand.min_raise, min_raise_before);
    }

    #[test]
    fn fold_out_win_matches_literal_scenario() {
        // Seats 0,1,2 at 100 each, blinds 1/2, dealer seat 0: fold, fold,
        // BB wins uncontested.
        let mut table = table_with_seats(3, 100);
        let mut hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();
        assert_eq!(hand.dealer_seat_number, 0);
        let first = hand.current_turn_seat().unwrap();
        hand.process_action(&mut table, first, Action::Fold, 1, &name_of).unwrap();
        let second = hand.current_turn_seat().unwrap();
        hand.process_action(&mut table, second, Action::Fold, 2, &name_of).unwrap();
        assert_eq!(hand.winners.len(), 1);
        assert_eq!(hand.winners[0].seat_number, 2);
        assert_eq!(hand.winners[0].amount, 3);
        let stacks: Vec<u64> = table.seats.iter().map(|s| s.stack).collect();
        assert_eq!(stacks, vec![100, 99, 101]);
    }

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn ace_low_straight_beats_one_pair_at_showdown() {
        let mut table = table_with_seats(2, 100);
        let mut hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();

        table.seats[0].hole_cards = Some((card(Rank::Ace, Suit::Spades), card(Rank::Two, Suit::Clubs)));
        table.seats[1].hole_cards = Some((card(Rank::King, Suit::Diamonds), card(Rank::King, Suit::Hearts)));
        hand.community_cards = vec![
            card(Rank::Five, Suit::Clubs),
            card(Rank::Four, Suit::Hearts),
            card(Rank::Three, Suit::Spades),
            card(Rank::Two, Suit::Diamonds),
            card(Rank::Nine, Suit::Hearts),
        ];
        hand.contributions = vec![2, 2];

        hand.enter_showdown(&mut table, 10, &name_of).unwrap();

        assert_eq!(hand.winners.len(), 1);
        assert_eq!(hand.winners[0].seat_number, 0);
        assert_eq!(hand.winners[0].hand_name, crate::eval::HandRank::Straight.name());
    }

    #[test]
    fn tied_hands_split_the_pot_with_odd_chip_to_earlier_seat() {
        // Seat 2 folded after contributing dead money that doesn't form its
        // own side pot (no other contributor at that level), so it carries
        // forward into the main pot per compute_side_pots' carry rule,
        // leaving an odd 7-chip pot split between the two tied survivors.
        let mut table = table_with_seats(3, 100);
        let mut hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();

        // Board alone is an unbeatable straight flush; neither surviving
        // seat's hole cards improve on it, so seats 0 and 1 tie.
        hand.community_cards = vec![
            card(Rank::Nine, Suit::Spades),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Seven, Suit::Spades),
            card(Rank::Six, Suit::Spades),
            card(Rank::Five, Suit::Spades),
        ];
        table.seats[0].hole_cards = Some((card(Rank::Two, Suit::Clubs), card(Rank::Three, Suit::Diamonds)));
        table.seats[1].hole_cards = Some((card(Rank::Two, Suit::Hearts), card(Rank::Three, Suit::Clubs)));
        table.seats[2].has_folded = true;
        hand.contributions = vec![2, 2, 3];

        hand.enter_showdown(&mut table, 10, &name_of).unwrap();

        assert_eq!(hand.side_pots.len(), 1);
        assert_eq!(hand.side_pots[0].amount, 7);
        assert_eq!(hand.winners.len(), 2);
        let winner_for = |seat: usize| hand.winners.iter().find(|w| w.seat_number == seat).unwrap();
        assert_eq!(winner_for(0).amount, 4);
        assert_eq!(winner_for(1).amount, 3);
    }

    #[test]
    fn three_way_all_in_produces_expected_side_pots() {
        // Stacks 10, 40, 100 all-in preflop: main pot 30 (3x10) eligible to
        // all three, side pot 60 (2x30) eligible to the two bigger stacks.
        // The third seat's bet beyond what anyone can match (100-40) forms
        // its own single-entrant pot, which is this engine's way of handing
        // an uncalled excess straight back to the seat that posted it.
        let mut table = table_with_seats(3, 100);
        table.seats[0].stack = 10;
        table.seats[1].stack = 40;
        table.seats[2].stack = 100;
        let mut hand = HandState::start(&mut table, 1, "h1", 0, &name_of).unwrap();
        hand.contributions = vec![10, 40, 100];

        let pots = hand.compute_side_pots(&table);
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 30);
        assert_eq!(pots[0].eligible_seats, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 60);
        assert_eq!(pots[1].eligible_seats, vec![1, 2]);
        assert_eq!(pots[2].amount, 60);
        assert_eq!(pots[2].eligible_seats, vec![2]);
    }
}
