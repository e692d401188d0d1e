//! Tunable match rules.

use serde::{Deserialize, Serialize};

/// Numeric rules governing the economy, cooking, washing, and the map switch.
///
/// Every field falls back to its default when absent from a configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Number of turns in a full match.
    pub total_turns: u32,
    /// Passive income credited to each team at every tick.
    pub money_per_turn: i64,
    /// Balance each team starts with.
    pub starting_money: i64,
    /// Cook ticks needed to move food from raw to cooked.
    pub cook_progress: u32,
    /// Cook ticks after which food burns.
    pub burn_progress: u32,
    /// Wash ticks needed to clean one plate.
    pub plate_wash_progress: u32,
    /// First turn of the map switch window.
    pub switch_turn: u32,
    /// Length of the map switch window in turns.
    pub switch_duration: u32,
    /// Debit the order penalty when an order expires uncompleted.
    pub charge_expiry_penalty: bool,
}

impl Rules {
    /// First turn after the switch window closes.
    #[must_use]
    pub const fn switch_window_end(&self) -> u32 {
        self.switch_turn.saturating_add(self.switch_duration)
    }

    /// Reports whether a team may switch maps on `turn`.
    #[must_use]
    pub const fn switch_window_open(&self, turn: u32) -> bool {
        turn >= self.switch_turn && turn < self.switch_window_end()
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            total_turns: 500,
            money_per_turn: 1,
            starting_money: 0,
            cook_progress: 20,
            burn_progress: 40,
            plate_wash_progress: 2,
            switch_turn: 250,
            switch_duration: 100,
            charge_expiry_penalty: false,
        }
    }
}
