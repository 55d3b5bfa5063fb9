//! 52-card deck and card types. Deck shuffling draws from a CSPRNG per the
//! engine's requirement that randomness strong enough to resist prediction
//! backs every hand dealt — a predictable shuffle is a fatal bug, not a
//! cosmetic one.

use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn wire(&self) -> char {
        match self {
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
            Suit::Spades => 's',
        }
    }

    pub fn from_wire(c: char) -> Option<Self> {
        match c {
            'h' | 'H' => Some(Suit::Hearts),
            'd' | 'D' => Some(Suit::Diamonds),
            'c' | 'C' => Some(Suit::Clubs),
            's' | 'S' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value with Ace high (14). Ace-low straights are handled as a
    /// special case by the evaluator, not by this mapping.
    pub fn value(&self) -> u8 {
        *self as u8 + 2
    }

    pub fn from_value(value: u8) -> Self {
        match value {
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            13 => Rank::King,
            14 => Rank::Ace,
            other => panic!("invalid rank value: {other}"),
        }
    }

    pub fn wire(&self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "2" => Some(Rank::Two),
            "3" => Some(Rank::Three),
            "4" => Some(Rank::Four),
            "5" => Some(Rank::Five),
            "6" => Some(Rank::Six),
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "T" | "t" | "10" => Some(Rank::Ten),
            "J" | "j" => Some(Rank::Jack),
            "Q" | "q" => Some(Rank::Queen),
            "K" | "k" => Some(Rank::King),
            "A" | "a" => Some(Rank::Ace),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.wire())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.wire())
    }
}

/// Error raised when the process cannot source cryptographically strong
/// randomness. The engine must refuse to start a hand rather than fall back
/// to a weaker source.
#[derive(Debug, thiserror::Error)]
#[error("failed to source cryptographically strong randomness for shuffle")]
pub struct ShuffleError;

/// A single hand's private deck. Exclusively owned by the hand that dealt
/// it; cards are drawn by advancing a cursor, never by removing elements.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    /// Builds all 52 cards and shuffles them with Fisher-Yates, drawing
    /// index randomness from the OS CSPRNG.
    pub fn shuffled() -> Result<Self, ShuffleError> {
        let mut cards = Vec::with_capacity(52);
        for &suit in &Suit::ALL {
            for &rank in &Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        // touch the generator once up front so a broken source fails loudly
        // before we commit to dealing instead of partway through a shuffle.
        // `OsRng` is fallible (`TryRngCore`, not `RngCore`) in rand 0.9; probe
        // it directly, then adapt it into an infallible `RngCore` for the
        // actual shuffle via `unwrap_err`, which panics only if the source
        // breaks between the probe and the shuffle itself.
        let mut probe = [0u8; 8];
        OsRng.try_fill_bytes(&mut probe).map_err(|_| ShuffleError)?;
        let mut rng = OsRng.unwrap_err();
        cards.shuffle(&mut rng);
        Ok(Self { cards, next: 0 })
    }

    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied();
        if card.is_some() {
            self.next += 1;
        }
        card
    }

    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).filter_map(|_| self.draw()).collect()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shuffled_deck_has_52_unique_cards() {
        let mut deck = Deck::shuffled().unwrap();
        let mut seen = HashSet::new();
        let mut count = 0;
        while let Some(card) = deck.draw() {
            seen.insert((card.rank, card.suit));
            count += 1;
        }
        assert_eq!(count, 52);
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn draw_n_respects_remaining_cards() {
        let mut deck = Deck::shuffled().unwrap();
        let hand = deck.draw_n(2);
        assert_eq!(hand.len(), 2);
        assert_eq!(deck.remaining(), 50);
    }

    #[test]
    fn wire_round_trip() {
        for &rank in &Rank::ALL {
            assert_eq!(Rank::from_wire(rank.wire()), Some(rank));
        }
        for &suit in &Suit::ALL {
            assert_eq!(Suit::from_wire(suit.wire()), Some(suit));
        }
    }
}
