//! Construction of a world from loader-supplied kitchens, orders and spawns.

use std::collections::{BTreeMap, BTreeSet};

use cookoff_core::{CellCoord, KitchenMap, Order, PerTeam, Rules, Team, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{kitchen::Kitchen, World};

/// Initial data for one team, as produced by a map loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSetup {
    /// The team's home kitchen.
    pub map: KitchenMap,
    /// Orders the team can serve over the match.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Cells where the team's bots start. Empty means a single bot at the kitchen centre.
    #[serde(default)]
    pub spawns: Vec<CellCoord>,
}

/// Everything needed to start a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Red team data.
    pub red: TeamSetup,
    /// Blue team data.
    pub blue: TeamSetup,
    /// Overrides the first turn of the switch window.
    #[serde(default)]
    pub switch_turn: Option<u32>,
    /// Overrides the length of the switch window.
    #[serde(default)]
    pub switch_duration: Option<u32>,
}

/// Reasons a match setup cannot be turned into a world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// The kitchen's tile count does not match its dimensions.
    #[error("{team} kitchen tile count does not match its dimensions")]
    MalformedKitchen {
        /// Team owning the kitchen.
        team: Team,
    },
    /// The kitchen has nowhere for a bot to stand.
    #[error("{team} kitchen has no walkable cell")]
    NoWalkableCell {
        /// Team owning the kitchen.
        team: Team,
    },
    /// A spawn cell is out of bounds or not walkable.
    #[error("{team} spawn {cell} is not a walkable cell")]
    UnwalkableSpawn {
        /// Team owning the spawn.
        team: Team,
        /// Offending cell.
        cell: CellCoord,
    },
    /// A spawn cell is listed more than once.
    #[error("{team} spawn {cell} is listed more than once")]
    DuplicateSpawn {
        /// Team owning the spawn.
        team: Team,
        /// Offending cell.
        cell: CellCoord,
    },
    /// A box claims stock but stores no prototype item.
    #[error("{team} box at {cell} has a count but no item")]
    BoxWithoutItem {
        /// Team owning the kitchen.
        team: Team,
        /// Offending cell.
        cell: CellCoord,
    },
    /// Two orders share an identifier.
    #[error("order id {id} is used more than once")]
    DuplicateOrder {
        /// Offending identifier.
        id: u32,
    },
}

impl World {
    /// Builds the world for a new match.
    ///
    /// No bots exist yet; spawn them with `Command::SpawnBot` at the cells reported by
    /// [`crate::query::spawn_cells`].
    pub fn new(setup: MatchSetup, rules: Rules) -> Result<Self, SetupError> {
        let rules = Rules {
            switch_turn: setup.switch_turn.unwrap_or(rules.switch_turn),
            switch_duration: setup.switch_duration.unwrap_or(rules.switch_duration),
            ..rules
        };

        let mut seen_orders = BTreeSet::new();
        for order in setup.red.orders.iter().chain(setup.blue.orders.iter()) {
            if !seen_orders.insert(order.id) {
                return Err(SetupError::DuplicateOrder { id: order.id.get() });
            }
        }
        let next_order_id = seen_orders
            .last()
            .map_or(1, |id| id.get().saturating_add(1));

        let (red_kitchen, red_spawns) = prepare(Team::Red, setup.red.map, setup.red.spawns)?;
        let (blue_kitchen, blue_spawns) = prepare(Team::Blue, setup.blue.map, setup.blue.spawns)?;

        Ok(Self {
            money: PerTeam::new(rules.starting_money, rules.starting_money),
            rules,
            turn: 0,
            kitchens: PerTeam::new(red_kitchen, blue_kitchen),
            bots: BTreeMap::new(),
            orders: PerTeam::new(setup.red.orders, setup.blue.orders),
            spawns: PerTeam::new(red_spawns, blue_spawns),
            switched: PerTeam::default(),
            next_bot_id: 1,
            next_order_id,
        })
    }
}

fn prepare(
    team: Team,
    map: KitchenMap,
    spawns: Vec<CellCoord>,
) -> Result<(Kitchen, Vec<CellCoord>), SetupError> {
    if !map.is_consistent() {
        return Err(SetupError::MalformedKitchen { team });
    }
    for (cell, tile) in map.cells() {
        if let Tile::Box { item: None, count } = tile {
            if *count > 0 {
                return Err(SetupError::BoxWithoutItem { team, cell });
            }
        }
    }

    let kitchen = Kitchen::new(map);
    let mut seen = BTreeSet::new();
    for cell in &spawns {
        if !kitchen.map.is_walkable(*cell) {
            return Err(SetupError::UnwalkableSpawn { team, cell: *cell });
        }
        if !seen.insert(*cell) {
            return Err(SetupError::DuplicateSpawn { team, cell: *cell });
        }
    }

    let spawns = if spawns.is_empty() {
        vec![kitchen
            .default_spawn()
            .ok_or(SetupError::NoWalkableCell { team })?]
    } else {
        spawns
    };
    Ok((kitchen, spawns))
}
