//! Carryable goods: food, plates, and pans.

use serde::{Deserialize, Serialize};

use crate::Rules;

/// Ingredient types sold by shops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoodType {
    /// Cookable, not choppable.
    Egg,
    /// Choppable, not cookable.
    Onions,
    /// Choppable and cookable.
    Meat,
    /// Served as bought.
    Noodles,
    /// Served as bought.
    Sauce,
}

impl FoodType {
    /// Every food type, ordered by identifier.
    pub const ALL: [FoodType; 5] = [
        FoodType::Egg,
        FoodType::Onions,
        FoodType::Meat,
        FoodType::Noodles,
        FoodType::Sauce,
    ];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Egg => "EGG",
            Self::Onions => "ONIONS",
            Self::Meat => "MEAT",
            Self::Noodles => "NOODLES",
            Self::Sauce => "SAUCE",
        }
    }

    /// Stable numeric identifier.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Egg => 0,
            Self::Onions => 1,
            Self::Meat => 2,
            Self::Noodles => 3,
            Self::Sauce => 4,
        }
    }

    /// Whether the food can be chopped on a counter.
    #[must_use]
    pub const fn can_chop(self) -> bool {
        matches!(self, Self::Onions | Self::Meat)
    }

    /// Whether the food can be cooked in a pan.
    #[must_use]
    pub const fn can_cook(self) -> bool {
        matches!(self, Self::Egg | Self::Meat)
    }

    /// Shop price.
    #[must_use]
    pub const fn buy_cost(self) -> i64 {
        match self {
            Self::Egg => 20,
            Self::Onions => 30,
            Self::Meat => 80,
            Self::Noodles => 40,
            Self::Sauce => 10,
        }
    }
}

/// How far a food has cooked. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookStage {
    /// Not cooked yet.
    #[default]
    Raw,
    /// Cooked and ready to serve.
    Cooked,
    /// Left in the pan for too long.
    Burnt,
}

impl CookStage {
    /// Numeric stage exposed to agents: 0 raw, 1 cooked, 2 burnt.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::Cooked => 1,
            Self::Burnt => 2,
        }
    }

    /// Stage reached after `progress` cook ticks.
    #[must_use]
    pub const fn for_progress(progress: u32, rules: &Rules) -> Self {
        if progress >= rules.burn_progress {
            Self::Burnt
        } else if progress >= rules.cook_progress {
            Self::Cooked
        } else {
            Self::Raw
        }
    }

    /// Cook progress at the start of this stage.
    ///
    /// Used when food re-enters a pan so cooking resumes where it left off.
    #[must_use]
    pub const fn initial_progress(self, rules: &Rules) -> u32 {
        match self {
            Self::Raw => 0,
            Self::Cooked => rules.cook_progress,
            Self::Burnt => rules.burn_progress,
        }
    }
}

/// A single ingredient.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Food {
    /// Ingredient type.
    pub kind: FoodType,
    /// Set once the food has been chopped.
    #[serde(default)]
    pub chopped: bool,
    /// Cooking stage.
    #[serde(default)]
    pub cooked_stage: CookStage,
}

impl Food {
    /// Creates raw, unchopped food, as sold by a shop.
    #[must_use]
    pub const fn new(kind: FoodType) -> Self {
        Self {
            kind,
            chopped: false,
            cooked_stage: CookStage::Raw,
        }
    }

    /// Whether this food may go into a pan.
    #[must_use]
    pub const fn can_cook(&self) -> bool {
        self.kind.can_cook()
    }

    /// Whether this food may be chopped.
    #[must_use]
    pub const fn can_chop(&self) -> bool {
        self.kind.can_chop()
    }
}

/// A plate carrying foods in plating order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plate {
    /// Foods in the order they were plated.
    #[serde(default)]
    pub foods: Vec<Food>,
    /// Dirty plates must be washed before receiving food or being submitted.
    #[serde(default)]
    pub dirty: bool,
}

impl Plate {
    /// Creates a clean, empty plate.
    #[must_use]
    pub const fn clean() -> Self {
        Self {
            foods: Vec::new(),
            dirty: false,
        }
    }
}

/// A pan that can host one food while it cooks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pan {
    /// Food currently in the pan.
    #[serde(default)]
    pub food: Option<Food>,
}

impl Pan {
    /// Creates an empty pan.
    #[must_use]
    pub const fn empty() -> Self {
        Self { food: None }
    }
}

/// Anything a bot can carry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    /// A single ingredient.
    Food(Food),
    /// A plate, possibly with food on it.
    Plate(Plate),
    /// A pan, possibly with food in it.
    Pan(Pan),
}

impl Item {
    /// Structural key deciding whether two items may share a box stack.
    #[must_use]
    pub fn signature(&self) -> ItemSignature {
        match self {
            Self::Food(food) => ItemSignature::Food(FoodKey::of(food)),
            Self::Plate(plate) => ItemSignature::Plate {
                dirty: plate.dirty,
                foods: plate.foods.iter().map(FoodKey::of).collect(),
            },
            Self::Pan(pan) => ItemSignature::Pan(pan.food.as_ref().map(FoodKey::of)),
        }
    }

    /// Returns the item in its canonical empty form, as left behind by the trash.
    ///
    /// Plates come back clean and empty, pans come back empty, food disappears.
    #[must_use]
    pub fn emptied(&self) -> Option<Item> {
        match self {
            Self::Food(_) => None,
            Self::Plate(_) => Some(Self::Plate(Plate::clean())),
            Self::Pan(_) => Some(Self::Pan(Pan::empty())),
        }
    }

    /// Borrows the food when this item is one.
    #[must_use]
    pub fn as_food(&self) -> Option<&Food> {
        match self {
            Self::Food(food) => Some(food),
            _ => None,
        }
    }

    /// Borrows the plate when this item is one.
    #[must_use]
    pub fn as_plate(&self) -> Option<&Plate> {
        match self {
            Self::Plate(plate) => Some(plate),
            _ => None,
        }
    }
}

/// Equality key used by box stacking.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemSignature {
    /// A lone food.
    Food(FoodKey),
    /// A plate and the foods on it, in order.
    Plate {
        /// Whether the plate is dirty.
        dirty: bool,
        /// Keys of the plated foods.
        foods: Vec<FoodKey>,
    },
    /// A pan and the food inside it.
    Pan(Option<FoodKey>),
}

/// Signature of a single food: type, chopped flag and cook stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FoodKey {
    kind: FoodType,
    chopped: bool,
    stage: CookStage,
}

impl FoodKey {
    fn of(food: &Food) -> Self {
        Self {
            kind: food.kind,
            chopped: food.chopped,
            stage: food.cooked_stage,
        }
    }
}

/// Things a shop may sell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Buyable {
    /// A raw ingredient.
    Food(FoodType),
    /// A clean, empty plate.
    Plate,
    /// An empty pan.
    Pan,
}

impl Buyable {
    /// The default menu: every food, plates, and pans.
    #[must_use]
    pub fn full_menu() -> Vec<Buyable> {
        FoodType::ALL
            .into_iter()
            .map(Buyable::Food)
            .chain([Buyable::Plate, Buyable::Pan])
            .collect()
    }

    /// Price of the item.
    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            Self::Food(kind) => kind.buy_cost(),
            Self::Plate => 2,
            Self::Pan => 4,
        }
    }

    /// A freshly bought instance of the item.
    #[must_use]
    pub const fn fresh(self) -> Item {
        match self {
            Self::Food(kind) => Item::Food(Food::new(kind)),
            Self::Plate => Item::Plate(Plate::clean()),
            Self::Pan => Item::Pan(Pan::empty()),
        }
    }

    /// Display name of the item.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Food(kind) => kind.name(),
            Self::Plate => "PLATE",
            Self::Pan => "PAN",
        }
    }
}
