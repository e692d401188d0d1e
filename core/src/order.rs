//! Customer orders.

use serde::{Deserialize, Serialize};

use crate::{BotId, FoodType, OrderId};

/// A request for a multiset of foods, worth a reward if served in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Identifier, unique within the match.
    pub id: OrderId,
    /// Foods the plate must carry, in any order.
    pub required: Vec<FoodType>,
    /// Turn on which the order becomes active.
    pub created_turn: u32,
    /// First turn on which the order is no longer active.
    pub expires_turn: u32,
    /// Money credited on completion.
    pub reward: i64,
    /// Money debited on expiry when the rules enable it.
    #[serde(default)]
    pub penalty: i64,
    /// Bot that announced it is working on the order.
    #[serde(default)]
    pub claimed_by: Option<BotId>,
    /// Turn on which the order was completed.
    #[serde(default)]
    pub completed_turn: Option<u32>,
    /// Set once the expiry of this order has been processed.
    #[serde(default)]
    pub expired: bool,
}

impl Order {
    /// Reports whether the order can be served on `turn`.
    #[must_use]
    pub fn is_active(&self, turn: u32) -> bool {
        self.completed_turn.is_none() && self.created_turn <= turn && turn < self.expires_turn
    }

    /// Reports whether `foods` is exactly the required multiset.
    #[must_use]
    pub fn matches(&self, foods: &[FoodType]) -> bool {
        if foods.len() != self.required.len() {
            return false;
        }
        let mut wanted = self.required.clone();
        let mut offered = foods.to_vec();
        wanted.sort_unstable();
        offered.sort_unstable();
        wanted == offered
    }

    /// Reports whether `bot` may submit against this order.
    ///
    /// Unclaimed orders are open to every bot of the owning team.
    #[must_use]
    pub fn is_available_to(&self, bot: BotId) -> bool {
        self.claimed_by.map_or(true, |claimant| claimant == bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(required: Vec<FoodType>) -> Order {
        Order {
            id: OrderId::new(1),
            required,
            created_turn: 5,
            expires_turn: 10,
            reward: 100,
            penalty: 0,
            claimed_by: None,
            completed_turn: None,
            expired: false,
        }
    }

    #[test]
    fn active_window_is_half_open() {
        let order = order(vec![FoodType::Egg]);
        assert!(!order.is_active(4));
        assert!(order.is_active(5));
        assert!(order.is_active(9));
        assert!(!order.is_active(10));
    }

    #[test]
    fn completed_orders_are_inactive() {
        let mut order = order(vec![FoodType::Egg]);
        order.completed_turn = Some(6);
        assert!(!order.is_active(7));
    }

    #[test]
    fn matching_ignores_order_but_respects_multiplicity() {
        let order = order(vec![FoodType::Meat, FoodType::Noodles, FoodType::Meat]);
        assert!(order.matches(&[FoodType::Noodles, FoodType::Meat, FoodType::Meat]));
        assert!(!order.matches(&[FoodType::Noodles, FoodType::Meat]));
        assert!(!order.matches(&[FoodType::Noodles, FoodType::Meat, FoodType::Noodles]));
    }

    #[test]
    fn claims_restrict_submitters() {
        let mut order = order(vec![FoodType::Sauce]);
        assert!(order.is_available_to(BotId::new(3)));
        order.claimed_by = Some(BotId::new(2));
        assert!(order.is_available_to(BotId::new(2)));
        assert!(!order.is_available_to(BotId::new(3)));
    }
}
