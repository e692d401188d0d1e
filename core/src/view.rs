//! By-value observation records handed to agents.
//!
//! Nothing in this module borrows world state; every value is an isolated copy.

use serde::{Deserialize, Serialize};

use crate::{BotId, CellCoord, Food, FoodType, Item, Order, OrderId, Rules, Team};

/// Public view of a single food.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodView {
    /// Ingredient type.
    pub food: FoodType,
    /// Numeric identifier of the ingredient type.
    pub food_id: u8,
    /// Whether the food has been chopped.
    pub chopped: bool,
    /// 0 raw, 1 cooked, 2 burnt.
    pub cooked_stage: u8,
}

impl From<&Food> for FoodView {
    fn from(food: &Food) -> Self {
        Self {
            food: food.kind,
            food_id: food.kind.id(),
            chopped: food.chopped,
            cooked_stage: food.cooked_stage.as_u8(),
        }
    }
}

/// Public view of a carried item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemView {
    /// A single ingredient.
    Food(FoodView),
    /// A plate and its foods in plating order.
    Plate {
        /// Whether the plate is dirty.
        dirty: bool,
        /// Plated foods.
        food: Vec<FoodView>,
    },
    /// A pan and its food.
    Pan {
        /// Food in the pan.
        food: Option<FoodView>,
    },
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        match item {
            Item::Food(food) => Self::Food(food.into()),
            Item::Plate(plate) => Self::Plate {
                dirty: plate.dirty,
                food: plate.foods.iter().map(FoodView::from).collect(),
            },
            Item::Pan(pan) => Self::Pan {
                food: pan.food.as_ref().map(FoodView::from),
            },
        }
    }
}

/// Public view of a bot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSnapshot {
    /// Identifier of the bot.
    pub bot_id: BotId,
    /// Team controlling the bot.
    pub team: Team,
    /// Cell the bot stands on.
    pub cell: CellCoord,
    /// Current balance of the bot's team.
    pub team_money: i64,
    /// Item in the bot's hands.
    pub holding: Option<ItemView>,
    /// Kitchen the bot is physically located in.
    pub map_team: Team,
}

/// Public view of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Identifier of the order.
    pub order_id: OrderId,
    /// Required foods.
    pub required: Vec<FoodType>,
    /// First active turn.
    pub created_turn: u32,
    /// First inactive turn.
    pub expires_turn: u32,
    /// Reward on completion.
    pub reward: i64,
    /// Penalty on expiry.
    pub penalty: i64,
    /// Advisory claimant.
    pub claimed_by: Option<BotId>,
    /// Turn of completion.
    pub completed_turn: Option<u32>,
    /// Whether the order can be served on the observed turn.
    pub is_active: bool,
}

impl OrderSnapshot {
    /// Captures `order` as seen on `turn`.
    #[must_use]
    pub fn capture(order: &Order, turn: u32) -> Self {
        Self {
            order_id: order.id,
            required: order.required.clone(),
            created_turn: order.created_turn,
            expires_turn: order.expires_turn,
            reward: order.reward,
            penalty: order.penalty,
            claimed_by: order.claimed_by,
            completed_turn: order.completed_turn,
            is_active: order.is_active(turn),
        }
    }
}

/// State of the map switch window as seen by one team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchInfo {
    /// Current turn.
    pub turn: u32,
    /// First turn of the window.
    pub switch_turn: u32,
    /// Window length in turns.
    pub switch_duration: u32,
    /// Whether the window is open on the current turn.
    pub window_active: bool,
    /// Last turn of the window.
    pub window_end_turn: u32,
    /// Whether the observing team already switched.
    pub my_team_switched: bool,
    /// Whether the opposing team already switched.
    pub enemy_team_switched: bool,
}

impl SwitchInfo {
    /// Describes the window on `turn` for a team with the given switch flags.
    #[must_use]
    pub fn capture(rules: &Rules, turn: u32, mine: bool, enemy: bool) -> Self {
        Self {
            turn,
            switch_turn: rules.switch_turn,
            switch_duration: rules.switch_duration,
            window_active: rules.switch_window_open(turn),
            window_end_turn: rules.switch_window_end().saturating_sub(1),
            my_team_switched: mine,
            enemy_team_switched: enemy,
        }
    }

    /// Whether the observing team may switch now.
    #[must_use]
    pub const fn can_switch(&self) -> bool {
        self.window_active && !self.my_team_switched
    }
}
