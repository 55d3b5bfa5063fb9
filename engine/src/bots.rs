//! Bot decision policy. `BotStrategy::decide` is a pure function: it reads
//! the table/hand and proposes one `Action`, and never mutates state itself
//! — the game manager (`crate::manager`) is the only thing that calls
//! `HandState::process_action`, so a rejected proposal can be retried with
//! a safe fallback without the policy needing to know about that protocol.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::cards::{Card, Rank};
use crate::eval::{self, HandRank};
use crate::hand::{HandState, Phase};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotStrategy {
    /// Loose-passive: calls most bets, rarely raises.
    Fish,
    /// Tight-aggressive: folds weak hands preflop, raises big with strong
    /// holdings, calls cheaply with medium strength.
    Tag,
    /// Loose-aggressive: plays most hands, raises frequently, bluffs a
    /// non-trivial fraction of the time.
    Lag,
}

impl BotStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            BotStrategy::Fish => "fish",
            BotStrategy::Tag => "tag",
            BotStrategy::Lag => "lag",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "fish" => Some(BotStrategy::Fish),
            "tag" => Some(BotStrategy::Tag),
            "lag" => Some(BotStrategy::Lag),
            _ => None,
        }
    }

    /// Decides an action for `seat_number` at the given hand/table. `roll`
    /// is a caller-supplied `[0,1)` random draw so the policy itself stays a
    /// pure function of its inputs — the caller is free to source it from a
    /// CSPRNG in production and a fixed sequence in tests.
    pub fn decide(&self, seat_number: usize, hand: &HandState, table: &Table, roll: f64) -> Action {
        let seat = &table.seats[seat_number];
        let to_call = hand.current_bet.saturating_sub(seat.current_bet);
        let pot_after_call = hand.pot + to_call;
        let strength = hand_strength(seat_number, hand, table);

        match self {
            BotStrategy::Fish => decide_fish(hand, seat.stack, to_call, pot_after_call, strength, roll),
            BotStrategy::Tag => decide_tag(hand, seat.stack, to_call, pot_after_call, strength, roll),
            BotStrategy::Lag => decide_lag(hand, seat.stack, to_call, pot_after_call, strength, roll),
        }
    }
}

fn decide_fish(hand: &HandState, stack: u64, to_call: u64, pot_after_call: u64, strength: f64, roll: f64) -> Action {
    if to_call == 0 {
        // rarely raises/bets even with nothing to call
        if strength > 0.85 && roll < 0.3 {
            return open_bet_or_raise(hand, stack, pot_after_call);
        }
        return Action::Check;
    }
    let call_is_large = to_call as f64 > (hand.min_raise.max(1) as f64) * 8.0;
    if call_is_large && strength < 0.15 {
        return Action::Fold;
    }
    if strength > 0.9 && roll < 0.2 {
        return open_bet_or_raise(hand, stack, pot_after_call);
    }
    Action::Call
}

fn decide_tag(hand: &HandState, stack: u64, to_call: u64, pot_after_call: u64, strength: f64, roll: f64) -> Action {
    if hand.phase == Phase::Preflop && to_call > 0 && strength < 0.55 {
        // ~55% preflop fold rate against anything it has to call.
        if roll < 0.55 {
            return Action::Fold;
        }
    }
    if strength > 0.7 {
        return raise_sized(hand, stack, pot_after_call, 2.0 / 3.0);
    }
    if to_call == 0 {
        return Action::Check;
    }
    if strength > 0.35 {
        return Action::Call;
    }
    Action::Fold
}

fn decide_lag(hand: &HandState, stack: u64, to_call: u64, pot_after_call: u64, strength: f64, roll: f64) -> Action {
    let bluffing = roll < 0.2;
    // caps re-raises per round so two LAGs don't loop forever: count the
    // consecutive raise/all-in actions at the tail of the log, since a call
    // or check closes off that chain.
    let raises_this_round = hand
        .actions
        .iter()
        .rev()
        .take_while(|a| matches!(a.action, Action::Raise { .. } | Action::AllIn | Action::Bet { .. }))
        .count();
    if (strength > 0.45 || bluffing) && raises_this_round < 3 {
        return raise_sized(hand, stack, pot_after_call, 0.75);
    }
    if to_call == 0 {
        return Action::Check;
    }
    if strength > 0.2 || bluffing {
        return Action::Call;
    }
    Action::Fold
}

fn open_bet_or_raise(hand: &HandState, stack: u64, pot_after_call: u64) -> Action {
    raise_sized(hand, stack, pot_after_call, 2.0 / 3.0)
}

/// Proposes a bet/raise sized to `fraction` of the pot (after calling),
/// clamped to the seat's stack and the table's legal minimum. The game
/// manager falls back to check/fold if this is rejected as too small.
fn raise_sized(hand: &HandState, stack: u64, pot_after_call: u64, fraction: f64) -> Action {
    let sizing = ((pot_after_call as f64) * fraction).round() as u64;
    if hand.current_bet == 0 {
        let amount = sizing.max(1).min(stack);
        Action::Bet { amount }
    } else {
        let min_total = hand.current_bet + hand.min_raise;
        let target = (hand.current_bet + sizing).max(min_total).min(stack);
        Action::Raise { amount: target }
    }
}

/// Scalar hand-strength estimate in `[0, 1]`. Preflop this is a cheap
/// rank/suited/connectedness heuristic; post-flop it folds in the actual
/// best-made-rank plus draw potential. Exact formulas are deliberately
/// approximate per spec §4.5 — only the qualitative ordering between
/// strategies is load-bearing for tests.
pub fn hand_strength(seat_number: usize, hand: &HandState, table: &Table) -> f64 {
    let Some((a, b)) = table.seats[seat_number].hole_cards else {
        return 0.0;
    };
    if hand.community_cards.is_empty() {
        return preflop_strength(a, b);
    }
    postflop_strength(a, b, &hand.community_cards)
}

fn preflop_strength(a: Card, b: Card) -> f64 {
    let hi = a.rank.value().max(b.rank.value()) as f64;
    let lo = a.rank.value().min(b.rank.value()) as f64;
    let paired = a.rank == b.rank;
    let suited = a.suit == b.suit;
    let gap = (hi - lo).abs();

    let mut score = (hi + lo) / 28.0; // two aces -> 1.0, two twos -> ~0.14
    if paired {
        score += 0.35 + hi / 100.0;
    }
    if suited {
        score += 0.08;
    }
    if gap <= 1.0 {
        score += 0.07;
    } else if gap <= 3.0 {
        score += 0.03;
    } else {
        score -= 0.05;
    }
    score.clamp(0.0, 1.0)
}

fn postflop_strength(a: Card, b: Card, board: &[Card]) -> f64 {
    let mut all = board.to_vec();
    all.push(a);
    all.push(b);
    let made = eval::evaluate(&all);

    let base = match made.rank {
        HandRank::HighCard => 0.05,
        HandRank::OnePair => 0.30,
        HandRank::TwoPair => 0.55,
        HandRank::ThreeOfAKind => 0.68,
        HandRank::Straight => 0.80,
        HandRank::Flush => 0.85,
        HandRank::FullHouse => 0.92,
        HandRank::FourOfAKind => 0.97,
        HandRank::StraightFlush | HandRank::RoyalFlush => 1.0,
    };

    let draw_bonus = draw_potential(a, b, board);
    (base + draw_bonus).clamp(0.0, 1.0)
}

/// Adds a small bonus for a flush draw or open-ended straight draw, so a
/// drawing hand isn't scored identically to pure air.
fn draw_potential(a: Card, b: Card, board: &[Card]) -> f64 {
    let mut suit_counts = std::collections::HashMap::new();
    for c in board.iter().chain([&a, &b]) {
        *suit_counts.entry(c.suit).or_insert(0u8) += 1;
    }
    let flush_draw = suit_counts.values().any(|&c| c == 4);

    let mut values: Vec<u8> = board
        .iter()
        .chain([&a, &b])
        .map(|c| c.rank.value())
        .collect();
    values.sort_unstable();
    values.dedup();
    let mut run = 1u8;
    let mut best_run = 1u8;
    for w in values.windows(2) {
        if w[1] == w[0] + 1 {
            run += 1;
            best_run = best_run.max(run);
        } else {
            run = 1;
        }
    }
    let straight_draw = best_run == 4;

    let mut bonus = 0.0;
    if flush_draw {
        bonus += 0.12;
    }
    if straight_draw {
        bonus += 0.10;
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    #[test]
    fn pocket_aces_outscore_offsuit_trash() {
        let aces = preflop_strength(
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Ace, Suit::Diamonds),
        );
        let trash = preflop_strength(
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Two, Suit::Clubs),
        );
        assert!(aces > trash);
    }

    #[test]
    fn suited_connectors_beat_offsuit_gappers() {
        let suited = preflop_strength(
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::Ten, Suit::Hearts),
        );
        let offsuit_gap = preflop_strength(
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::King, Suit::Clubs),
        );
        assert!(suited > offsuit_gap);
    }

    #[test]
    fn strategy_labels_round_trip() {
        for s in [BotStrategy::Fish, BotStrategy::Tag, BotStrategy::Lag] {
            assert_eq!(BotStrategy::from_label(s.label()), Some(s));
        }
    }
}
