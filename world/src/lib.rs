#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Cookoff kitchen contest.
//!
//! The world owns both kitchens, every bot, the money ledgers, the order lists and the
//! switch bookkeeping. It changes only through [`apply`]; everything else reads it through
//! [`query`], which hands out isolated copies.

mod actions;
mod economy;
mod kitchen;
mod setup;
mod snapshot;
mod switch;
mod tick;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

use std::collections::BTreeMap;

use cookoff_core::{
    Action, ActionError, BotId, CellCoord, Command, Event, Item, Order, PerTeam, Rules, Team,
};
use tracing::warn;

use crate::{actions::Scene, kitchen::Kitchen};

pub use setup::{MatchSetup, SetupError, TeamSetup};
pub use snapshot::WorldSnapshot;

/// Represents the authoritative Cookoff world state.
#[derive(Clone, Debug)]
pub struct World {
    rules: Rules,
    turn: u32,
    kitchens: PerTeam<Kitchen>,
    bots: BTreeMap<BotId, Bot>,
    money: PerTeam<i64>,
    orders: PerTeam<Vec<Order>>,
    spawns: PerTeam<Vec<CellCoord>>,
    switched: PerTeam<bool>,
    next_bot_id: u32,
    next_order_id: u32,
}

/// A bot standing in one of the kitchens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bot {
    id: BotId,
    team: Team,
    map_team: Team,
    cell: CellCoord,
    holding: Option<Item>,
}

impl Bot {
    /// Identifier of the bot.
    #[must_use]
    pub const fn id(&self) -> BotId {
        self.id
    }

    /// Team controlling the bot.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Kitchen the bot currently stands in.
    #[must_use]
    pub const fn map_team(&self) -> Team {
        self.map_team
    }

    /// Cell the bot occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Item in the bot's hands.
    #[must_use]
    pub const fn holding(&self) -> Option<&Item> {
        self.holding.as_ref()
    }
}

impl World {
    fn add_bot(&mut self, team: Team, cell: CellCoord) -> Result<BotId, ActionError> {
        let kitchen = self.kitchens.get_mut(team);
        if !kitchen.map.in_bounds(cell) {
            return Err(ActionError::OutOfBounds);
        }
        if !kitchen.map.is_walkable(cell) {
            return Err(ActionError::NotWalkable);
        }
        if !kitchen.occupancy.can_enter(cell) {
            return Err(ActionError::Occupied);
        }
        let id = BotId::new(self.next_bot_id);
        self.next_bot_id += 1;
        kitchen.occupancy.occupy(id, cell);
        let _ = self.bots.insert(
            id,
            Bot {
                id,
                team,
                map_team: team,
                cell,
                holding: None,
            },
        );
        Ok(id)
    }

    fn check_move(&self, bot: BotId, dx: i32, dy: i32) -> Result<CellCoord, ActionError> {
        let bot = self.bots.get(&bot).ok_or(ActionError::UnknownBot)?;
        if dx.abs() > 1 || dy.abs() > 1 || (dx == 0 && dy == 0) {
            return Err(ActionError::IllegalStep);
        }
        let kitchen = self.kitchens.get(bot.map_team);
        let target = bot
            .cell
            .offset(dx, dy)
            .filter(|cell| kitchen.map.in_bounds(*cell))
            .ok_or(ActionError::OutOfBounds)?;
        if !kitchen.map.is_walkable(target) {
            return Err(ActionError::NotWalkable);
        }
        if !kitchen.occupancy.can_enter(target) {
            return Err(ActionError::Occupied);
        }
        Ok(target)
    }

    fn move_bot(
        &mut self,
        bot_id: BotId,
        dx: i32,
        dy: i32,
    ) -> Result<(Team, CellCoord, CellCoord), ActionError> {
        let target = self.check_move(bot_id, dx, dy)?;
        let bot = self.bots.get_mut(&bot_id).ok_or(ActionError::UnknownBot)?;
        let occupancy = &mut self.kitchens.get_mut(bot.map_team).occupancy;
        let from = bot.cell;
        occupancy.vacate(from);
        occupancy.occupy(bot_id, target);
        bot.cell = target;
        Ok((bot.map_team, from, target))
    }

    fn perform(
        &mut self,
        bot_id: BotId,
        action: Action,
        cell: CellCoord,
    ) -> Result<Option<Event>, ActionError> {
        let bot = self.bots.get_mut(&bot_id).ok_or(ActionError::UnknownBot)?;
        let kitchen = self.kitchens.get_mut(bot.map_team);
        if !kitchen.map.in_bounds(cell) {
            return Err(ActionError::OutOfBounds);
        }
        if !bot.cell.is_adjacent(cell) {
            return Err(ActionError::TooFar);
        }
        let tile = kitchen.map.tile_mut(cell).ok_or(ActionError::OutOfBounds)?;
        actions::resolve(
            action,
            Scene {
                bot: bot_id,
                team: bot.team,
                turn: self.turn,
                rules: &self.rules,
                hand: &mut bot.holding,
                tile,
                money: self.money.get_mut(bot.team),
                orders: self.orders.get_mut(bot.team),
            },
        )
    }

    fn preview(
        &self,
        bot_id: BotId,
        action: Action,
        cell: CellCoord,
    ) -> Result<(), ActionError> {
        let bot = self.bots.get(&bot_id).ok_or(ActionError::UnknownBot)?;
        let map = &self.kitchens.get(bot.map_team).map;
        if !map.in_bounds(cell) {
            return Err(ActionError::OutOfBounds);
        }
        if !bot.cell.is_adjacent(cell) {
            return Err(ActionError::TooFar);
        }
        let mut tile = map.tile(cell).cloned().ok_or(ActionError::OutOfBounds)?;
        let mut hand = bot.holding.clone();
        let mut money = *self.money.get(bot.team);
        let mut orders = self.orders.get(bot.team).clone();
        actions::resolve(
            action,
            Scene {
                bot: bot_id,
                team: bot.team,
                turn: self.turn,
                rules: &self.rules,
                hand: &mut hand,
                tile: &mut tile,
                money: &mut money,
                orders: &mut orders,
            },
        )
        .map(|_| ())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartTurn => world.start_turn(out_events),
        Command::SpawnBot { team, cell } => match world.add_bot(team, cell) {
            Ok(bot) => out_events.push(Event::BotSpawned { bot, team, cell }),
            Err(reason) => warn!(%team, %cell, %reason, "bot spawn refused"),
        },
        Command::MoveBot { bot, dx, dy } => match world.move_bot(bot, dx, dy) {
            Ok((map, from, to)) => out_events.push(Event::BotMoved { bot, map, from, to }),
            Err(reason) => out_events.push(Event::MoveRejected { bot, reason }),
        },
        Command::Act { bot, action, cell } => match world.perform(bot, action, cell) {
            Ok(follow_up) => {
                out_events.extend(follow_up);
                out_events.push(Event::ActionPerformed { bot, action, cell });
            }
            Err(reason) => out_events.push(Event::ActionRejected {
                bot,
                action,
                reason,
            }),
        },
        Command::SwitchMaps { team } => match world.request_switch(team) {
            Ok(()) => out_events.push(Event::TeamSwitched {
                team,
                turn: world.turn,
            }),
            Err(reason) => out_events.push(Event::SwitchRejected { team, reason }),
        },
        Command::AdjustMoney { team, delta } => {
            let balance = world.add_team_money(team, delta);
            out_events.push(Event::MoneyAdjusted {
                team,
                delta,
                balance,
            });
        }
        Command::SpawnOrder {
            team,
            required,
            duration,
            reward,
            penalty,
        } => {
            let order = world.spawn_order(team, required, duration, reward, penalty);
            out_events.push(Event::OrderSpawned { team, order });
        }
        Command::ClaimOrder { team, order, bot } => match world.claim_order(team, order, bot) {
            Ok(()) => out_events.push(Event::OrderClaimed { team, order, bot }),
            Err(reason) => out_events.push(Event::ClaimRejected {
                team,
                order,
                reason,
            }),
        },
    }
}

/// Query functions that provide read-only access to the world state.
///
/// Functions returning owned values hand out deep copies; nothing returned here can be
/// used to mutate the world.
pub mod query {
    use cookoff_core::{
        Action, ActionError, BotId, BotSnapshot, CellCoord, ItemView, KitchenMap, OrderSnapshot,
        PerTeam, Rules, SwitchInfo, Team, Tile,
    };

    use super::{Bot, World, WorldSnapshot};

    /// Current turn number. Zero before the first tick.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Rules in force for this match, including switch overrides from the setup.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Balance of `team`.
    #[must_use]
    pub fn team_money(world: &World, team: Team) -> i64 {
        *world.money.get(team)
    }

    /// Deep copy of the kitchen owned by `team`.
    #[must_use]
    pub fn map(world: &World, team: Team) -> KitchenMap {
        world.kitchens.get(team).map.clone()
    }

    /// Deep copy of one tile of the kitchen owned by `team`.
    #[must_use]
    pub fn tile(world: &World, team: Team, cell: CellCoord) -> Option<Tile> {
        world.kitchens.get(team).map.tile(cell).cloned()
    }

    /// Whether `cell` lies inside the kitchen owned by `team`.
    #[must_use]
    pub fn in_bounds(world: &World, team: Team, cell: CellCoord) -> bool {
        world.kitchens.get(team).map.in_bounds(cell)
    }

    /// Borrows a bot.
    #[must_use]
    pub fn bot(world: &World, bot: BotId) -> Option<&Bot> {
        world.bots.get(&bot)
    }

    /// Identifiers of every bot of `team`, ascending.
    #[must_use]
    pub fn team_bot_ids(world: &World, team: Team) -> Vec<BotId> {
        world
            .bots
            .values()
            .filter(|bot| bot.team == team)
            .map(|bot| bot.id)
            .collect()
    }

    /// Public view of a bot.
    #[must_use]
    pub fn bot_snapshot(world: &World, bot: BotId) -> Option<BotSnapshot> {
        world.bots.get(&bot).map(|bot| capture_bot(world, bot))
    }

    /// Public views of the orders owned by `team`.
    #[must_use]
    pub fn orders(world: &World, team: Team) -> Vec<OrderSnapshot> {
        world
            .orders
            .get(team)
            .iter()
            .map(|order| OrderSnapshot::capture(order, world.turn))
            .collect()
    }

    /// State of the switch window from the point of view of `team`.
    #[must_use]
    pub fn switch_info(world: &World, team: Team) -> SwitchInfo {
        SwitchInfo::capture(
            &world.rules,
            world.turn,
            *world.switched.get(team),
            *world.switched.get(team.opponent()),
        )
    }

    /// Whether `team` has used its switch.
    #[must_use]
    pub fn has_switched(world: &World, team: Team) -> bool {
        *world.switched.get(team)
    }

    /// Cells where the bots of `team` start the match.
    #[must_use]
    pub fn spawn_cells(world: &World, team: Team) -> &[CellCoord] {
        world.spawns.get(team)
    }

    /// Validates a single step without performing it.
    pub fn check_move(world: &World, bot: BotId, dx: i32, dy: i32) -> Result<(), ActionError> {
        world.check_move(bot, dx, dy).map(|_| ())
    }

    /// Validates an action against scratch copies of the state it would touch.
    pub fn check_action(
        world: &World,
        bot: BotId,
        action: Action,
        cell: CellCoord,
    ) -> Result<(), ActionError> {
        world.preview(bot, action, cell)
    }

    /// Captures the complete world for replay recording.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot {
            turn: world.turn,
            money: world.money.clone(),
            maps: PerTeam::new(map(world, Team::Red), map(world, Team::Blue)),
            bots: world
                .bots
                .values()
                .map(|bot| capture_bot(world, bot))
                .collect(),
            orders: PerTeam::new(orders(world, Team::Red), orders(world, Team::Blue)),
            switched: world.switched.clone(),
        }
    }

    fn capture_bot(world: &World, bot: &Bot) -> BotSnapshot {
        BotSnapshot {
            bot_id: bot.id,
            team: bot.team,
            cell: bot.cell,
            team_money: *world.money.get(bot.team),
            holding: bot.holding.as_ref().map(ItemView::from),
            map_team: bot.map_team,
        }
    }
}
