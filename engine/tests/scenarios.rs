//! End-to-end scenarios exercised through the public `GameManager` API
//! only, as opposed to the per-module unit tests that reach into private
//! `HandState` internals. Configured with zero think-delay/showdown-hold so
//! a bot-only table plays through many hands without any real waiting.

use poker_engine::cards::{Card, Rank, Suit};
use poker_engine::eval::evaluate;
use poker_engine::table::TableConfig;
use poker_engine::{Action, Config, GameManager};
use rstest::rstest;

fn three_seat_config() -> Config {
    Config {
        tick_period_ms: 10,
        human_turn_timeout_ms: 30_000,
        bot_think_delay_ms: 0,
        showdown_hold_ms: 0,
        bot_only_showdown_hold_ms: 0,
        bot_only_max_recursion: 50,
        max_hand_history: 50,
        seed_tables: vec![TableConfig {
            id: "main".to_string(),
            name: "Main".to_string(),
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 40,
            max_buy_in: 200,
            max_seats: 3,
        }],
    }
}

#[test]
fn fold_out_win_produces_literal_scenario_stacks() {
    let manager = GameManager::new(three_seat_config());

    // Seeding always fills every seat with one bot per strategy; vacate
    // them so the three human seats below land on 0, 1, 2 exactly.
    let seeded: Vec<_> = manager
        .get_table("main", None)
        .unwrap()
        .seats
        .iter()
        .filter_map(|s| s.agent_id.clone())
        .collect();
    for bot in seeded {
        manager.leave_agent("main", &bot).unwrap();
    }

    let a = manager.sit_agent("main", 0, "A", 100, None, false).unwrap();
    let b = manager.sit_agent("main", 1, "B", 100, None, false).unwrap();
    let c = manager.sit_agent("main", 2, "C", 100, None, false).unwrap();

    manager.process_table("main").unwrap(); // deals the hand, posts blinds

    manager.submit_action("main", &a, Action::Fold).unwrap();
    manager.submit_action("main", &b, Action::Fold).unwrap();

    let view = manager.get_table("main", None).unwrap();
    let stacks: Vec<u64> = view.seats.iter().map(|s| s.stack).collect();
    assert_eq!(stacks, vec![100, 99, 101]);
    assert_eq!(view.seats[2].agent_id.as_ref(), Some(&c));
}

#[test]
fn bot_only_table_completes_several_hands_without_real_waiting() {
    let manager = GameManager::new(three_seat_config());
    for _ in 0..300 {
        manager.process_table("main").unwrap();
    }
    let view = manager.get_table("main", None).unwrap();
    assert!(view.hand_count >= 10, "expected at least 10 completed hands, got {}", view.hand_count);
}

fn card(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

#[rstest]
#[case(vec![
    card(Rank::Ace, Suit::Spades), card(Rank::Two, Suit::Clubs),
    card(Rank::Five, Suit::Clubs), card(Rank::Four, Suit::Hearts),
    card(Rank::Three, Suit::Spades), card(Rank::Two, Suit::Diamonds),
    card(Rank::Nine, Suit::Hearts),
])]
#[case(vec![
    card(Rank::Nine, Suit::Hearts), card(Rank::Two, Suit::Diamonds),
    card(Rank::Three, Suit::Spades), card(Rank::Four, Suit::Hearts),
    card(Rank::Five, Suit::Clubs), card(Rank::Two, Suit::Clubs),
    card(Rank::Ace, Suit::Spades),
])]
fn evaluation_is_independent_of_input_order(#[case] cards: Vec<Card>) {
    let evaluated = evaluate(&cards);
    assert_eq!(evaluated.rank, poker_engine::eval::HandRank::Straight);
    assert_eq!(evaluated.values, vec![5]);
}
