//! Order lifecycle and the money ledger.

use cookoff_core::{ActionError, BotId, Event, FoodType, Item, Order, OrderId, Team, TileKind};
use tracing::debug;

use crate::{actions::Scene, World};

/// Matches the held plate against the team's orders and pays out the best match.
///
/// Eligible orders are active and either unclaimed or claimed by the submitting bot.
/// Ties go to the order expiring first, then the oldest, then the lowest id. On success
/// the plate stays in hand, empty and dirty.
pub(crate) fn submit_plate(scene: Scene<'_>) -> Result<Event, ActionError> {
    if scene.tile.kind() != TileKind::Submit {
        return Err(ActionError::WrongTile {
            expected: TileKind::Submit,
        });
    }
    let Some(Item::Plate(plate)) = scene.hand.as_mut() else {
        return Err(ActionError::NeedCleanPlate);
    };
    if plate.dirty {
        return Err(ActionError::NeedCleanPlate);
    }

    let served: Vec<FoodType> = plate.foods.iter().map(|food| food.kind).collect();
    let turn = scene.turn;
    let order = scene
        .orders
        .iter_mut()
        .filter(|order| {
            order.is_active(turn) && order.is_available_to(scene.bot) && order.matches(&served)
        })
        .min_by_key(|order| (order.expires_turn, order.created_turn, order.id))
        .ok_or(ActionError::NoMatchingOrder)?;

    order.completed_turn = Some(turn);
    *scene.money += order.reward;
    plate.foods.clear();
    plate.dirty = true;

    debug!(team = %scene.team, order = order.id.get(), reward = order.reward, "order completed");
    Ok(Event::OrderCompleted {
        team: scene.team,
        order: order.id,
        reward: order.reward,
        turn,
    })
}

impl World {
    pub(crate) fn add_team_money(&mut self, team: Team, delta: i64) -> i64 {
        let balance = self.money.get_mut(team);
        *balance += delta;
        *balance
    }

    pub(crate) fn spawn_order(
        &mut self,
        team: Team,
        required: Vec<FoodType>,
        duration: u32,
        reward: i64,
        penalty: i64,
    ) -> OrderId {
        let id = OrderId::new(self.next_order_id);
        self.next_order_id += 1;
        self.orders.get_mut(team).push(Order {
            id,
            required,
            created_turn: self.turn,
            expires_turn: self.turn.saturating_add(duration),
            reward,
            penalty,
            claimed_by: None,
            completed_turn: None,
            expired: false,
        });
        id
    }

    pub(crate) fn claim_order(
        &mut self,
        team: Team,
        order: OrderId,
        claimant: Option<BotId>,
    ) -> Result<(), ActionError> {
        if let Some(bot) = claimant {
            let owner = self.bots.get(&bot).ok_or(ActionError::UnknownBot)?.team();
            if owner != team {
                return Err(ActionError::ForeignBot);
            }
        }
        let entry = self
            .orders
            .get_mut(team)
            .iter_mut()
            .find(|candidate| candidate.id == order)
            .ok_or(ActionError::UnknownOrder)?;
        entry.claimed_by = claimant;
        Ok(())
    }

    /// Marks every order whose window closed as expired, charging penalties when enabled.
    pub(crate) fn expire_orders(&mut self, out_events: &mut Vec<Event>) {
        let turn = self.turn;
        let charge = self.rules.charge_expiry_penalty;
        for team in Team::TURN_ORDER {
            let mut charged = 0;
            for order in self.orders.get_mut(team).iter_mut() {
                if order.expired || order.completed_turn.is_some() || turn < order.expires_turn {
                    continue;
                }
                order.expired = true;
                let penalty = if charge { order.penalty } else { 0 };
                charged += penalty;
                debug!(%team, order = order.id.get(), penalty, "order expired");
                out_events.push(Event::OrderExpired {
                    team,
                    order: order.id,
                    penalty,
                });
            }
            *self.money.get_mut(team) -= charged;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookoff_core::{Food, Plate, Rules, Tile};

    fn order(id: u32, required: Vec<FoodType>, expires_turn: u32) -> Order {
        Order {
            id: OrderId::new(id),
            required,
            created_turn: 0,
            expires_turn,
            reward: 10 * i64::from(id),
            penalty: 5,
            claimed_by: None,
            completed_turn: None,
            expired: false,
        }
    }

    fn plate_of(kinds: &[FoodType]) -> Option<Item> {
        Some(Item::Plate(Plate {
            foods: kinds.iter().copied().map(Food::new).collect(),
            dirty: false,
        }))
    }

    fn submit(
        hand: &mut Option<Item>,
        orders: &mut Vec<Order>,
        money: &mut i64,
        bot: BotId,
    ) -> Result<Event, ActionError> {
        let rules = Rules::default();
        let mut tile = Tile::Submit;
        submit_plate(Scene {
            bot,
            team: Team::Red,
            turn: 3,
            rules: &rules,
            hand,
            tile: &mut tile,
            money,
            orders,
        })
    }

    #[test]
    fn submission_prefers_earliest_expiry() {
        let mut orders = vec![
            order(1, vec![FoodType::Noodles], 20),
            order(2, vec![FoodType::Noodles], 10),
        ];
        let mut hand = plate_of(&[FoodType::Noodles]);
        let mut money = 0;
        let event = submit(&mut hand, &mut orders, &mut money, BotId::new(1)).expect("match");
        assert_eq!(
            event,
            Event::OrderCompleted {
                team: Team::Red,
                order: OrderId::new(2),
                reward: 20,
                turn: 3,
            }
        );
        assert_eq!(money, 20);
        assert_eq!(orders[1].completed_turn, Some(3));
        assert_eq!(
            hand,
            Some(Item::Plate(Plate {
                foods: Vec::new(),
                dirty: true
            })),
            "plate stays in hand, emptied and dirty"
        );
    }

    #[test]
    fn failed_submission_has_no_side_effects() {
        let mut orders = vec![order(1, vec![FoodType::Egg, FoodType::Egg], 20)];
        let mut hand = plate_of(&[FoodType::Egg]);
        let mut money = 7;
        assert_eq!(
            submit(&mut hand, &mut orders, &mut money, BotId::new(1)),
            Err(ActionError::NoMatchingOrder)
        );
        assert_eq!(money, 7);
        assert_eq!(hand, plate_of(&[FoodType::Egg]));
        assert_eq!(orders[0].completed_turn, None);
    }

    #[test]
    fn claimed_orders_are_reserved_for_their_claimant() {
        let mut orders = vec![order(1, vec![FoodType::Sauce], 20)];
        orders[0].claimed_by = Some(BotId::new(9));
        let mut money = 0;
        let mut hand = plate_of(&[FoodType::Sauce]);
        assert_eq!(
            submit(&mut hand, &mut orders, &mut money, BotId::new(1)),
            Err(ActionError::NoMatchingOrder)
        );
        assert!(submit(&mut hand, &mut orders, &mut money, BotId::new(9)).is_ok());
    }

    #[test]
    fn expired_orders_cannot_be_served() {
        let mut orders = vec![order(1, vec![FoodType::Sauce], 3)];
        let mut money = 0;
        let mut hand = plate_of(&[FoodType::Sauce]);
        assert_eq!(
            submit(&mut hand, &mut orders, &mut money, BotId::new(1)),
            Err(ActionError::NoMatchingOrder)
        );
    }

    #[test]
    fn dirty_plate_cannot_be_submitted() {
        let mut orders = vec![order(1, Vec::new(), 20)];
        let mut money = 0;
        let mut hand = Some(Item::Plate(Plate {
            foods: Vec::new(),
            dirty: true,
        }));
        assert_eq!(
            submit(&mut hand, &mut orders, &mut money, BotId::new(1)),
            Err(ActionError::NeedCleanPlate)
        );
    }
}
