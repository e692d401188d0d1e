//! Validation failures reported by the world and the action gateways.

use serde::Serialize;
use thiserror::Error;

use crate::TileKind;

/// Reasons a move, action, or switch request may be refused.
///
/// Validation failures are never fatal: they are logged and surfaced to the
/// caller as a `false` return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionError {
    /// No bot with the given identifier exists.
    #[error("unknown bot")]
    UnknownBot,
    /// The bot belongs to the other team.
    #[error("cannot control an enemy bot")]
    ForeignBot,
    /// The turn was revoked by the match watchdog.
    #[error("turn revoked by the match watchdog")]
    Revoked,
    /// The call arrived after the turn deadline.
    #[error("turn deadline has passed")]
    DeadlinePassed,
    /// The bot already used its move this turn.
    #[error("bot has already moved this turn")]
    NoMovesLeft,
    /// The bot already used its action this turn.
    #[error("bot has already acted this turn")]
    NoActionsLeft,
    /// A move must be a single step to one of the eight neighbours.
    #[error("illegal step; must be chebyshev distance 1")]
    IllegalStep,
    /// The target lies outside the kitchen.
    #[error("target is out of bounds")]
    OutOfBounds,
    /// The target is more than one cell away from the bot.
    #[error("target is too far from the bot")]
    TooFar,
    /// The destination cell cannot be walked on.
    #[error("destination is not walkable")]
    NotWalkable,
    /// Another bot stands on the destination cell.
    #[error("destination is occupied by another bot")]
    Occupied,
    /// The bot must have empty hands.
    #[error("bot is already holding something")]
    HandsFull,
    /// The bot must be holding something.
    #[error("bot is holding nothing")]
    HandsEmpty,
    /// The target tile has nothing to pick up.
    #[error("nothing to pick up")]
    NothingToPickUp,
    /// The target box is empty.
    #[error("box is empty")]
    BoxEmpty,
    /// The target box stores a different kind of item.
    #[error("box stores a different item")]
    BoxMismatch,
    /// The target tile's slot is already taken.
    #[error("tile already holds an item")]
    SlotOccupied,
    /// The target tile has no item slot.
    #[error("tile cannot hold items")]
    CannotHoldItems,
    /// The resident pan still has food in it.
    #[error("cooker is busy; its pan has food")]
    CookerBusy,
    /// The cooker has no pan.
    #[error("cooker is missing a pan")]
    MissingPan,
    /// The cooker's pan already holds food.
    #[error("pan is already occupied")]
    PanOccupied,
    /// The food cannot be cooked.
    #[error("food cannot be cooked")]
    NotCookable,
    /// Only pans and cookable food can go onto a cooker.
    #[error("must hold a pan or cookable food to use a cooker")]
    CookerNeedsPanOrFood,
    /// The target tile is the wrong kind for this action.
    #[error("target must be a {expected} tile")]
    WrongTile {
        /// Kind of tile the action requires.
        expected: TileKind,
    },
    /// The food cannot be chopped.
    #[error("food is not choppable")]
    NotChoppable,
    /// The food is already chopped.
    #[error("food is already chopped")]
    AlreadyChopped,
    /// There is no food on the counter.
    #[error("nothing choppable on the counter")]
    NothingChoppable,
    /// The pan is empty.
    #[error("nothing in the pan")]
    PanEmpty,
    /// The shop does not sell the requested item.
    #[error("item is not on the shop menu")]
    NotOnMenu,
    /// The team cannot afford the item.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The sink table has no clean plates.
    #[error("no clean plates available")]
    NoCleanPlates,
    /// The bot must hold a dirty plate.
    #[error("bot is not holding a dirty plate")]
    NotHoldingDirtyPlate,
    /// The sink has no dirty plates.
    #[error("no dirty plates to wash")]
    NoDirtyPlates,
    /// Dirty plates cannot receive food.
    #[error("plate is dirty")]
    PlateDirty,
    /// Plating needs a plate and a food, one held and one on the target.
    #[error("need a plate and a food")]
    NeedPlateAndFood,
    /// Submission needs a clean plate in hand.
    #[error("bot must hold a clean plate")]
    NeedCleanPlate,
    /// No active, eligible order matches the plate.
    #[error("no matching order")]
    NoMatchingOrder,
    /// No order with the given identifier exists for the team.
    #[error("unknown order")]
    UnknownOrder,
    /// The switch window is not open.
    #[error("switch window is not open")]
    SwitchWindowClosed,
    /// The team already switched this match.
    #[error("team has already switched")]
    AlreadySwitched,
    /// No free walkable cell was available on the destination kitchen.
    #[error("no free spawn cell on the destination kitchen")]
    NoSpawnCell,
}
