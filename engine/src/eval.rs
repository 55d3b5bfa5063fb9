//! Best-5-of-7 hand evaluation and a total order over evaluated hands.

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandRank {
    pub fn name(&self) -> &'static str {
        match self {
            HandRank::HighCard => "High Card",
            HandRank::OnePair => "One Pair",
            HandRank::TwoPair => "Two Pair",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::Straight => "Straight",
            HandRank::Flush => "Flush",
            HandRank::FullHouse => "Full House",
            HandRank::FourOfAKind => "Four of a Kind",
            HandRank::StraightFlush => "Straight Flush",
            HandRank::RoyalFlush => "Royal Flush",
        }
    }
}

/// `values` is the lexicographic tiebreaker for hands sharing `rank` (e.g.
/// two pair: `[high pair, low pair, kicker]`). `best_five` are the cards
/// that produced the evaluation, in tiebreaker order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedHand {
    pub rank: HandRank,
    pub values: Vec<u8>,
    pub best_five: Vec<Card>,
    pub name: String,
}

impl EvaluatedHand {
    /// Total order over evaluated hands; `Ordering::Equal` means an exact
    /// tie for pot-splitting purposes.
    pub fn compare(a: &EvaluatedHand, b: &EvaluatedHand) -> Ordering {
        match a.rank.cmp(&b.rank) {
            Ordering::Equal => compare_values(&a.values, &b.values),
            other => other,
        }
    }
}

impl PartialOrd for EvaluatedHand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(Self::compare(self, other))
    }
}

fn compare_values(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Evaluates the best five-card hand out of at least five cards (typically
/// two hole cards plus the board). Enumerates all `C(n,5)` subsets; n is at
/// most 7 in this engine so this is cheap.
pub fn evaluate(cards: &[Card]) -> EvaluatedHand {
    assert!(cards.len() >= 5, "need at least 5 cards to evaluate a hand");
    if cards.len() == 5 {
        return evaluate_five(cards);
    }
    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|five| evaluate_five(&five))
        .max_by(EvaluatedHand::compare)
        .expect("combinations(5) of >=5 cards is non-empty")
}

fn evaluate_five(cards: &[Card]) -> EvaluatedHand {
    debug_assert_eq!(cards.len(), 5);

    let mut rank_counts: HashMap<Rank, u8> = HashMap::new();
    for card in cards {
        *rank_counts.entry(card.rank).or_insert(0) += 1;
    }
    let mut suit_counts: HashMap<Suit, u8> = HashMap::new();
    for card in cards {
        *suit_counts.entry(card.suit).or_insert(0) += 1;
    }
    let is_flush = suit_counts.values().any(|&c| c == 5);
    let (is_straight, straight_high) = check_straight(cards);

    if is_flush && is_straight {
        let rank = if straight_high == Rank::Ace {
            HandRank::RoyalFlush
        } else {
            HandRank::StraightFlush
        };
        return finish(rank, vec![straight_high.value()], cards);
    }

    if let Some(quad) = rank_of_count(&rank_counts, 4) {
        let kicker = best_other(&rank_counts, &[quad]);
        return finish(HandRank::FourOfAKind, vec![quad.value(), kicker[0].value()], cards);
    }

    if let Some(trip) = rank_of_count(&rank_counts, 3) {
        if let Some(pair) = rank_counts
            .iter()
            .filter(|(r, &c)| **r != trip && c >= 2)
            .map(|(r, _)| *r)
            .max()
        {
            return finish(
                HandRank::FullHouse,
                vec![trip.value(), pair.value()],
                cards,
            );
        }
    }

    if is_flush {
        let values = descending_values(cards);
        return finish(HandRank::Flush, values, cards);
    }

    if is_straight {
        return finish(HandRank::Straight, vec![straight_high.value()], cards);
    }

    if let Some(trip) = rank_of_count(&rank_counts, 3) {
        let mut kickers = best_other(&rank_counts, &[trip]);
        kickers.truncate(2);
        let mut values = vec![trip.value()];
        values.extend(kickers.iter().map(Rank::value));
        return finish(HandRank::ThreeOfAKind, values, cards);
    }

    let mut pairs: Vec<Rank> = rank_counts
        .iter()
        .filter(|(_, &c)| c == 2)
        .map(|(r, _)| *r)
        .collect();
    pairs.sort_by(|a, b| b.cmp(a));

    if pairs.len() >= 2 {
        let high = pairs[0];
        let low = pairs[1];
        let kicker = best_other(&rank_counts, &[high, low]);
        return finish(
            HandRank::TwoPair,
            vec![high.value(), low.value(), kicker[0].value()],
            cards,
        );
    }

    if let Some(pair) = pairs.into_iter().next() {
        let mut kickers = best_other(&rank_counts, &[pair]);
        kickers.truncate(3);
        let mut values = vec![pair.value()];
        values.extend(kickers.iter().map(Rank::value));
        return finish(HandRank::OnePair, values, cards);
    }

    finish(HandRank::HighCard, descending_values(cards), cards)
}

fn finish(rank: HandRank, values: Vec<u8>, cards: &[Card]) -> EvaluatedHand {
    EvaluatedHand {
        name: rank.name().to_string(),
        rank,
        values,
        best_five: cards.to_vec(),
    }
}

fn rank_of_count(counts: &HashMap<Rank, u8>, n: u8) -> Option<Rank> {
    counts
        .iter()
        .filter(|(_, &c)| c == n)
        .map(|(r, _)| *r)
        .max()
}

/// Ranks other than `exclude`, descending, one entry per distinct rank
/// present (duplicates of the same rank collapse to a single kicker slot).
fn best_other(counts: &HashMap<Rank, u8>, exclude: &[Rank]) -> Vec<Rank> {
    let mut others: Vec<Rank> = counts
        .keys()
        .copied()
        .filter(|r| !exclude.contains(r))
        .collect();
    others.sort_by(|a, b| b.cmp(a));
    others
}

fn descending_values(cards: &[Card]) -> Vec<u8> {
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values
}

/// Returns whether `cards` forms a straight and, if so, its high card.
/// Recognizes the ace-low wheel (A-2-3-4-5) as a straight with high card 5.
fn check_straight(cards: &[Card]) -> (bool, Rank) {
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).unique().collect();
    if values.contains(&14) {
        values.push(1);
    }
    values.sort_unstable();

    let mut consecutive = 1;
    let mut high = 0u8;
    for i in 1..values.len() {
        if values[i] == values[i - 1] + 1 {
            consecutive += 1;
            if consecutive >= 5 {
                high = values[i];
            }
        } else if values[i] != values[i - 1] {
            consecutive = 1;
        }
    }

    if high > 0 {
        (true, Rank::from_value(high))
    } else {
        (false, Rank::Two)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank::*, Suit::*};

    fn c(rank: crate::cards::Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn royal_flush_beats_straight_flush() {
        let royal = evaluate(&[
            c(Ace, Hearts),
            c(King, Hearts),
            c(Queen, Hearts),
            c(Jack, Hearts),
            c(Ten, Hearts),
            c(Two, Clubs),
            c(Three, Clubs),
        ]);
        assert_eq!(royal.rank, HandRank::RoyalFlush);

        let sf = evaluate(&[
            c(Nine, Spades),
            c(Eight, Spades),
            c(Seven, Spades),
            c(Six, Spades),
            c(Five, Spades),
            c(King, Diamonds),
            c(Queen, Clubs),
        ]);
        assert_eq!(sf.rank, HandRank::StraightFlush);
        assert_eq!(sf.values, vec![9]);
        assert_eq!(EvaluatedHand::compare(&royal, &sf), Ordering::Greater);
    }

    #[test]
    fn ace_low_straight_is_five_high() {
        let hand = evaluate(&[
            c(Ace, Spades),
            c(Two, Clubs),
            c(Three, Diamonds),
            c(Four, Hearts),
            c(Five, Hearts),
            c(King, Diamonds),
            c(Queen, Clubs),
        ]);
        assert_eq!(hand.rank, HandRank::Straight);
        assert_eq!(hand.values, vec![5]);
    }

    #[test]
    fn four_of_a_kind_kicker() {
        let hand = evaluate(&[
            c(Ace, Hearts),
            c(Ace, Diamonds),
            c(Ace, Clubs),
            c(Ace, Spades),
            c(King, Hearts),
            c(Two, Diamonds),
            c(Three, Clubs),
        ]);
        assert_eq!(hand.rank, HandRank::FourOfAKind);
        assert_eq!(hand.values, vec![14, 13]);
    }

    #[test]
    fn compare_is_antisymmetric() {
        let a = evaluate(&[
            c(Ace, Hearts),
            c(Ace, Diamonds),
            c(King, Clubs),
            c(Queen, Spades),
            c(Jack, Hearts),
            c(Two, Diamonds),
            c(Three, Clubs),
        ]);
        let b = evaluate(&[
            c(King, Hearts),
            c(King, Diamonds),
            c(Queen, Clubs),
            c(Jack, Spades),
            c(Ten, Hearts),
            c(Two, Diamonds),
            c(Three, Clubs),
        ]);
        assert_eq!(
            EvaluatedHand::compare(&a, &b),
            EvaluatedHand::compare(&b, &a).reverse()
        );
    }

    #[test]
    fn order_independent_of_input_permutation() {
        let cards = [
            c(Ace, Hearts),
            c(King, Hearts),
            c(Queen, Hearts),
            c(Jack, Hearts),
            c(Ten, Hearts),
            c(Two, Clubs),
        ];
        let forward = evaluate(&cards);
        let mut reversed = cards.to_vec();
        reversed.reverse();
        let backward = evaluate(&reversed);
        assert_eq!(forward.rank, backward.rank);
        assert_eq!(forward.values, backward.values);
    }
}
