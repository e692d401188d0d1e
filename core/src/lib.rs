#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cookoff simulation kernel.
//!
//! This crate defines the data model and the message surface that connects the
//! authoritative world, the per-team action gateways, and the match driver.
//! Gateways submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what actually happened. Agents never see the
//! world directly; they only receive the by-value observation types defined in
//! this crate.

mod error;
mod item;
mod order;
mod rules;
mod tile;
mod view;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::ActionError;
pub use item::{Buyable, CookStage, Food, FoodKey, FoodType, Item, ItemSignature, Pan, Plate};
pub use order::Order;
pub use rules::Rules;
pub use tile::{KitchenMap, Tile, TileKind};
pub use view::{BotSnapshot, FoodView, ItemView, OrderSnapshot, SwitchInfo};

/// One of the two competing teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    /// The red team. Invoked second within a turn.
    Red,
    /// The blue team. Invoked first within a turn.
    Blue,
}

impl Team {
    /// Both teams in invocation order.
    pub const TURN_ORDER: [Team; 2] = [Team::Blue, Team::Red];

    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Upper-case display name used in logs and replays.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pair of values, one per team.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTeam<T> {
    /// Value owned by the red team.
    pub red: T,
    /// Value owned by the blue team.
    pub blue: T,
}

impl<T> PerTeam<T> {
    /// Creates a pair from explicit per-team values.
    #[must_use]
    pub const fn new(red: T, blue: T) -> Self {
        Self { red, blue }
    }

    /// Borrows the value belonging to `team`.
    #[must_use]
    pub fn get(&self, team: Team) -> &T {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    /// Mutably borrows the value belonging to `team`.
    pub fn get_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

/// Unique identifier assigned to a bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BotId(u32);

impl BotId {
    /// Creates a new bot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an order. Never reused within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(u32);

impl OrderId {
    /// Creates a new order identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single kitchen cell expressed as x (column) and y (row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Chess-king distance between two cells: `max(|dx|, |dy|)`.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether `other` is this cell or one of its eight neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.chebyshev_distance(other) <= 1
    }

    /// Applies a signed offset, returning `None` when the result would be negative.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<CellCoord> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Budgeted bot actions understood by the world.
///
/// Moves are not actions; they have their own budget and command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Take the item from a tile slot, or one unit from a box.
    Pickup,
    /// Put the held item onto a tile slot, box, or cooker.
    Place,
    /// Chop the food resting on a counter.
    Chop,
    /// Put held cookable food into the empty pan on a cooker.
    StartCook,
    /// Take the food out of a cooker's pan.
    TakeFromPan,
    /// Buy an item from a shop.
    Buy(Buyable),
    /// Combine a plate with a food, one held and one on the target tile.
    AddFoodToPlate,
    /// Take a clean plate from a sink table.
    TakeCleanPlate,
    /// Drop a held dirty plate into a sink.
    PutDirtyPlateInSink,
    /// Start washing the dirty plates stacked in a sink.
    WashSink,
    /// Throw away the held item.
    Trash,
    /// Submit the held plate against the team's orders.
    Submit,
}

impl Action {
    /// Label used in diagnostics, matching the gateway method name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pickup => "pickup()",
            Self::Place => "place()",
            Self::Chop => "chop()",
            Self::StartCook => "start_cook()",
            Self::TakeFromPan => "take_from_pan()",
            Self::Buy(_) => "buy()",
            Self::AddFoodToPlate => "add_food_to_plate()",
            Self::TakeCleanPlate => "take_clean_plate()",
            Self::PutDirtyPlateInSink => "put_dirty_plate_in_sink()",
            Self::WashSink => "wash_sink()",
            Self::Trash => "trash()",
            Self::Submit => "submit()",
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Runs the environmental tick that opens a new turn.
    StartTurn,
    /// Adds a bot for `team` on its home kitchen.
    SpawnBot {
        /// Team that will control the bot.
        team: Team,
        /// Walkable, unoccupied cell on the team's home kitchen.
        cell: CellCoord,
    },
    /// Moves a bot one step within its current kitchen.
    MoveBot {
        /// Bot attempting the move.
        bot: BotId,
        /// Column delta, one of -1, 0, 1.
        dx: i32,
        /// Row delta, one of -1, 0, 1.
        dy: i32,
    },
    /// Performs a budgeted action against a resolved target cell.
    Act {
        /// Bot performing the action.
        bot: BotId,
        /// Action to perform.
        action: Action,
        /// Target cell on the bot's current kitchen.
        cell: CellCoord,
    },
    /// Teleports every bot of `team` onto the opponent's kitchen.
    SwitchMaps {
        /// Team requesting the switch.
        team: Team,
    },
    /// Credits or debits a team's ledger.
    AdjustMoney {
        /// Team whose ledger changes.
        team: Team,
        /// Signed amount to add.
        delta: i64,
    },
    /// Appends a freshly numbered order to a team's order list.
    SpawnOrder {
        /// Team receiving the order.
        team: Team,
        /// Multiset of food that satisfies the order.
        required: Vec<FoodType>,
        /// Number of turns the order stays active, starting with the current turn.
        duration: u32,
        /// Money credited on completion.
        reward: i64,
        /// Money debited on expiry when the rules enable expiry penalties.
        penalty: i64,
    },
    /// Records (or clears) the advisory claim on an order.
    ClaimOrder {
        /// Team owning the order.
        team: Team,
        /// Order being claimed.
        order: OrderId,
        /// Claiming bot, or `None` to release the claim.
        bot: Option<BotId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A new turn began and the environmental tick ran.
    TurnStarted {
        /// Number of the turn that started.
        turn: u32,
    },
    /// A bot entered the match.
    BotSpawned {
        /// Identifier assigned to the bot.
        bot: BotId,
        /// Team controlling the bot.
        team: Team,
        /// Cell the bot occupies.
        cell: CellCoord,
    },
    /// A bot moved between two cells of the same kitchen.
    BotMoved {
        /// Bot that moved.
        bot: BotId,
        /// Kitchen the bot is standing in.
        map: Team,
        /// Cell before the move.
        from: CellCoord,
        /// Cell after the move.
        to: CellCoord,
    },
    /// A move request was refused.
    MoveRejected {
        /// Bot that attempted to move.
        bot: BotId,
        /// Why the move was refused.
        reason: ActionError,
    },
    /// An action succeeded.
    ActionPerformed {
        /// Bot that acted.
        bot: BotId,
        /// Action that was performed.
        action: Action,
        /// Target cell of the action.
        cell: CellCoord,
    },
    /// An action was refused.
    ActionRejected {
        /// Bot that attempted the action.
        bot: BotId,
        /// Action that was attempted.
        action: Action,
        /// Why the action was refused.
        reason: ActionError,
    },
    /// Food in a pan crossed a cooking threshold.
    FoodCooked {
        /// Kitchen holding the cooker.
        map: Team,
        /// Cooker cell.
        cell: CellCoord,
        /// Food being cooked.
        food: FoodType,
        /// Stage the food reached.
        stage: CookStage,
    },
    /// A sink finished washing one plate.
    PlateWashed {
        /// Kitchen holding the sink.
        map: Team,
        /// Sink cell.
        sink: CellCoord,
        /// Sink table that received the clean plate.
        table: CellCoord,
    },
    /// A team ledger was adjusted explicitly.
    MoneyAdjusted {
        /// Team whose ledger changed.
        team: Team,
        /// Signed amount applied.
        delta: i64,
        /// Balance after the adjustment.
        balance: i64,
    },
    /// An order was appended after setup.
    OrderSpawned {
        /// Team receiving the order.
        team: Team,
        /// Identifier allocated to the order.
        order: OrderId,
    },
    /// The advisory claim on an order changed.
    OrderClaimed {
        /// Team owning the order.
        team: Team,
        /// Order whose claim changed.
        order: OrderId,
        /// New claimant, if any.
        bot: Option<BotId>,
    },
    /// A claim or release request was refused.
    ClaimRejected {
        /// Team owning the order.
        team: Team,
        /// Order the request referred to.
        order: OrderId,
        /// Why the request was refused.
        reason: ActionError,
    },
    /// A submitted plate satisfied an order.
    OrderCompleted {
        /// Team credited with the reward.
        team: Team,
        /// Order that was completed.
        order: OrderId,
        /// Money credited.
        reward: i64,
        /// Turn of completion.
        turn: u32,
    },
    /// An order fell past its window without being completed.
    OrderExpired {
        /// Team owning the order.
        team: Team,
        /// Order that expired.
        order: OrderId,
        /// Penalty debited, zero when expiry penalties are disabled.
        penalty: i64,
    },
    /// A team moved all of its bots onto the opponent's kitchen.
    TeamSwitched {
        /// Team that switched.
        team: Team,
        /// Turn of the switch.
        turn: u32,
    },
    /// A switch request was refused.
    SwitchRejected {
        /// Team that requested the switch.
        team: Team,
        /// Why the switch was refused.
        reason: ActionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance_matches_king_moves() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(4, 4)), 1);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(3, 3)), 0);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(1, 4)), 2);
        assert!(origin.is_adjacent(CellCoord::new(2, 2)));
        assert!(!origin.is_adjacent(CellCoord::new(5, 3)));
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 1), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn teams_are_mutual_opponents() {
        assert_eq!(Team::Red.opponent(), Team::Blue);
        assert_eq!(Team::Blue.opponent(), Team::Red);
        assert_eq!(Team::TURN_ORDER, [Team::Blue, Team::Red]);
    }

    #[test]
    fn team_serializes_as_upper_case_name() {
        let json = serde_json::to_string(&Team::Blue).expect("serialize");
        assert_eq!(json, "\"BLUE\"");
    }
}
