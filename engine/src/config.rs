//! Process-wide timing and seed-table configuration. Spec §6 fixes these
//! values at startup from a known set; no env-var layer is called for, so
//! this stays a plain struct with a `Default` a test can override.

use crate::table::TableConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed cadence at which the ticker visits every table.
    pub tick_period_ms: u64,
    /// Wall-clock elapsed since `last_action_at` before a human seat is
    /// auto-folded (facing a bet) or auto-checked.
    pub human_turn_timeout_ms: u64,
    /// "Think" delay before a bot's turn is acted on at a table with at
    /// least one human seated.
    pub bot_think_delay_ms: u64,
    /// Display hold in `Phase::Showdown` before `CompleteShowdown` runs, at
    /// a table with at least one human seated.
    pub showdown_hold_ms: u64,
    /// Shorter showdown hold used at bot-only tables so unattended tables
    /// still progress at a reasonable pace.
    pub bot_only_showdown_hold_ms: u64,
    /// Bound on recursive `ProcessTable` passes within a single tick at a
    /// bot-only table, so trivial all-bot betting races through instead of
    /// waiting one tick per action.
    pub bot_only_max_recursion: u32,
    pub max_hand_history: usize,
    pub seed_tables: Vec<TableConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_period_ms: 500,
            human_turn_timeout_ms: 30_000,
            bot_think_delay_ms: 800,
            showdown_hold_ms: 3_000,
            bot_only_showdown_hold_ms: 300,
            bot_only_max_recursion: 50,
            max_hand_history: crate::table::MAX_HAND_HISTORY,
            seed_tables: default_seed_tables(),
        }
    }
}

/// The fixed micro/low/mid/high table set baked into the startup seed.
/// Spec §1 is explicit that arbitrary table creation by users is out of
/// scope; this is the whole universe of tables the process will ever run.
fn default_seed_tables() -> Vec<TableConfig> {
    vec![
        TableConfig {
            id: "micro".to_string(),
            name: "Micro Stakes".to_string(),
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 40,
            max_buy_in: 200,
            max_seats: 6,
        },
        TableConfig {
            id: "low".to_string(),
            name: "Low Stakes".to_string(),
            small_blind: 5,
            big_blind: 10,
            min_buy_in: 200,
            max_buy_in: 1_000,
            max_seats: 6,
        },
        TableConfig {
            id: "mid".to_string(),
            name: "Mid Stakes".to_string(),
            small_blind: 25,
            big_blind: 50,
            min_buy_in: 1_000,
            max_buy_in: 5_000,
            max_seats: 9,
        },
        TableConfig {
            id: "high".to_string(),
            name: "High Stakes".to_string(),
            small_blind: 100,
            big_blind: 200,
            min_buy_in: 4_000,
            max_buy_in: 20_000,
            max_seats: 9,
        },
    ]
}
