//! Serializable full-state copies of the world.

use cookoff_core::{BotSnapshot, KitchenMap, OrderSnapshot, PerTeam};
use serde::Serialize;

/// Full, isolated copy of the world at one instant, suitable for replays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorldSnapshot {
    /// Turn the snapshot was taken on.
    pub turn: u32,
    /// Team balances.
    pub money: PerTeam<i64>,
    /// Both kitchens with their contents.
    pub maps: PerTeam<KitchenMap>,
    /// Every bot, ordered by identifier.
    pub bots: Vec<BotSnapshot>,
    /// Both order lists as seen on `turn`.
    pub orders: PerTeam<Vec<OrderSnapshot>>,
    /// Whether each team has used its switch.
    pub switched: PerTeam<bool>,
}
