//! Variant-specific validation and effects of budgeted bot actions.
//!
//! Every handler works on a [`Scene`]: the acting bot's hands, the targeted tile and the
//! ledgers the action may touch. Handlers either fully apply their effect or leave the
//! scene untouched and report why.

use cookoff_core::{
    Action, ActionError, BotId, Buyable, CookStage, Event, Food, Item, Order, Pan, Plate, Rules,
    Team, Tile, TileKind,
};

use crate::economy;

/// Everything a single action may read or mutate.
pub(crate) struct Scene<'a> {
    pub(crate) bot: BotId,
    pub(crate) team: Team,
    pub(crate) turn: u32,
    pub(crate) rules: &'a Rules,
    pub(crate) hand: &'a mut Option<Item>,
    pub(crate) tile: &'a mut Tile,
    pub(crate) money: &'a mut i64,
    pub(crate) orders: &'a mut Vec<Order>,
}

/// Runs `action` against the scene, returning any follow-up event it produced.
pub(crate) fn resolve(action: Action, scene: Scene<'_>) -> Result<Option<Event>, ActionError> {
    match action {
        Action::Pickup => pickup(scene.hand, scene.tile).map(|()| None),
        Action::Place => place(scene.hand, scene.tile, scene.rules).map(|()| None),
        Action::Chop => chop(scene.hand, scene.tile).map(|()| None),
        Action::StartCook => start_cook(scene.hand, scene.tile, scene.rules).map(|()| None),
        Action::TakeFromPan => take_from_pan(scene.hand, scene.tile).map(|()| None),
        Action::Buy(item) => buy(scene.hand, scene.tile, item, scene.money).map(|()| None),
        Action::AddFoodToPlate => add_food_to_plate(scene.hand, scene.tile).map(|()| None),
        Action::TakeCleanPlate => take_clean_plate(scene.hand, scene.tile).map(|()| None),
        Action::PutDirtyPlateInSink => {
            put_dirty_plate_in_sink(scene.hand, scene.tile).map(|()| None)
        }
        Action::WashSink => wash_sink(scene.tile).map(|()| None),
        Action::Trash => trash(scene.hand, scene.tile).map(|()| None),
        Action::Submit => economy::submit_plate(scene).map(Some),
    }
}

fn pickup(hand: &mut Option<Item>, tile: &mut Tile) -> Result<(), ActionError> {
    if hand.is_some() {
        return Err(ActionError::HandsFull);
    }
    match tile {
        Tile::Box { item, count } => {
            let prototype = match item {
                Some(prototype) if *count > 0 => prototype.clone(),
                _ => {
                    *item = None;
                    *count = 0;
                    return Err(ActionError::BoxEmpty);
                }
            };
            *count -= 1;
            if *count == 0 {
                *item = None;
            }
            *hand = Some(prototype);
            Ok(())
        }
        Tile::Counter { item } => {
            *hand = Some(item.take().ok_or(ActionError::NothingToPickUp)?);
            Ok(())
        }
        Tile::Cooker { pan, cook_progress } => {
            let pan = pan.take().ok_or(ActionError::NothingToPickUp)?;
            *cook_progress = 0;
            *hand = Some(Item::Pan(pan));
            Ok(())
        }
        _ => Err(ActionError::NothingToPickUp),
    }
}

fn place(hand: &mut Option<Item>, tile: &mut Tile, rules: &Rules) -> Result<(), ActionError> {
    let Some(held) = hand.take() else {
        return Err(ActionError::HandsEmpty);
    };
    match place_item(held, tile, rules) {
        Ok(returned) => {
            *hand = returned;
            Ok(())
        }
        Err((held, error)) => {
            *hand = Some(held);
            Err(error)
        }
    }
}

/// Places `held` onto `tile`, returning whatever ends up back in the bot's hands.
///
/// On failure the held item is handed back with the reason.
fn place_item(
    held: Item,
    tile: &mut Tile,
    rules: &Rules,
) -> Result<Option<Item>, (Item, ActionError)> {
    match tile {
        Tile::Cooker { pan, cook_progress } => match held {
            Item::Pan(incoming) => {
                if pan.as_ref().is_some_and(|resident| resident.food.is_some()) {
                    return Err((Item::Pan(incoming), ActionError::CookerBusy));
                }
                *cook_progress = incoming
                    .food
                    .as_ref()
                    .filter(|food| food.can_cook())
                    .map_or(0, |food| food.cooked_stage.initial_progress(rules));
                Ok(pan.replace(incoming).map(Item::Pan))
            }
            Item::Food(food) => {
                let Some(resident) = pan.as_mut() else {
                    return Err((Item::Food(food), ActionError::MissingPan));
                };
                if resident.food.is_some() {
                    return Err((Item::Food(food), ActionError::PanOccupied));
                }
                if !food.can_cook() {
                    return Err((Item::Food(food), ActionError::NotCookable));
                }
                *cook_progress = food.cooked_stage.initial_progress(rules);
                resident.food = Some(food);
                Ok(None)
            }
            other => Err((other, ActionError::CookerNeedsPanOrFood)),
        },
        Tile::Box { item, count } => match item {
            Some(stored) if *count > 0 => {
                if stored.signature() != held.signature() {
                    return Err((held, ActionError::BoxMismatch));
                }
                *count += 1;
                Ok(None)
            }
            _ => {
                *item = Some(held);
                *count = 1;
                Ok(None)
            }
        },
        Tile::Counter { item } => {
            if item.is_some() {
                return Err((held, ActionError::SlotOccupied));
            }
            *item = Some(held);
            Ok(None)
        }
        _ => Err((held, ActionError::CannotHoldItems)),
    }
}

fn chop(hand: &Option<Item>, tile: &mut Tile) -> Result<(), ActionError> {
    let Tile::Counter { item } = tile else {
        return Err(wrong_tile(TileKind::Counter));
    };
    if hand.is_some() {
        return Err(ActionError::HandsFull);
    }
    match item {
        Some(Item::Food(food)) => {
            if !food.can_chop() {
                return Err(ActionError::NotChoppable);
            }
            if food.chopped {
                return Err(ActionError::AlreadyChopped);
            }
            food.chopped = true;
            Ok(())
        }
        _ => Err(ActionError::NothingChoppable),
    }
}

fn start_cook(hand: &mut Option<Item>, tile: &mut Tile, rules: &Rules) -> Result<(), ActionError> {
    let Tile::Cooker { pan, cook_progress } = tile else {
        return Err(wrong_tile(TileKind::Cooker));
    };
    let Some(resident) = pan.as_mut() else {
        return Err(ActionError::MissingPan);
    };
    if resident.food.is_some() {
        return Err(ActionError::PanOccupied);
    }
    let food = match hand.take() {
        Some(Item::Food(food)) if food.can_cook() => food,
        Some(other) => {
            *hand = Some(other);
            return Err(ActionError::NotCookable);
        }
        None => return Err(ActionError::HandsEmpty),
    };
    *cook_progress = food.cooked_stage.initial_progress(rules);
    resident.food = Some(food);
    Ok(())
}

fn take_from_pan(hand: &mut Option<Item>, tile: &mut Tile) -> Result<(), ActionError> {
    if hand.is_some() {
        return Err(ActionError::HandsFull);
    }
    let Tile::Cooker { pan, cook_progress } = tile else {
        return Err(wrong_tile(TileKind::Cooker));
    };
    let food = pan
        .as_mut()
        .and_then(|pan| pan.food.take())
        .ok_or(ActionError::PanEmpty)?;
    *cook_progress = 0;
    *hand = Some(Item::Food(food));
    Ok(())
}

fn buy(
    hand: &mut Option<Item>,
    tile: &mut Tile,
    wanted: Buyable,
    money: &mut i64,
) -> Result<(), ActionError> {
    let Tile::Shop { menu } = tile else {
        return Err(wrong_tile(TileKind::Shop));
    };
    if hand.is_some() {
        return Err(ActionError::HandsFull);
    }
    if !menu.contains(&wanted) {
        return Err(ActionError::NotOnMenu);
    }
    let cost = wanted.cost();
    if *money < cost {
        return Err(ActionError::InsufficientFunds);
    }
    *money -= cost;
    *hand = Some(wanted.fresh());
    Ok(())
}

fn add_food_to_plate(hand: &mut Option<Item>, tile: &mut Tile) -> Result<(), ActionError> {
    let Tile::Counter { item: slot } = tile else {
        return Err(ActionError::NeedPlateAndFood);
    };
    match (hand.take(), slot.take()) {
        (Some(Item::Plate(mut plate)), Some(Item::Food(food))) if !plate.dirty => {
            plate.foods.push(food);
            *hand = Some(Item::Plate(plate));
            Ok(())
        }
        (Some(Item::Food(food)), Some(Item::Plate(mut plate))) if !plate.dirty => {
            plate.foods.push(food);
            *slot = Some(Item::Plate(plate));
            Ok(())
        }
        (held, resting) => {
            let dirty = [&held, &resting]
                .into_iter()
                .flatten()
                .any(|item| item.as_plate().is_some_and(|plate| plate.dirty));
            let paired = matches!(
                (&held, &resting),
                (Some(Item::Plate(_)), Some(Item::Food(_)))
                    | (Some(Item::Food(_)), Some(Item::Plate(_)))
            );
            *hand = held;
            *slot = resting;
            if dirty && paired {
                Err(ActionError::PlateDirty)
            } else {
                Err(ActionError::NeedPlateAndFood)
            }
        }
    }
}

fn take_clean_plate(hand: &mut Option<Item>, tile: &mut Tile) -> Result<(), ActionError> {
    if hand.is_some() {
        return Err(ActionError::HandsFull);
    }
    let Tile::SinkTable { clean_plates } = tile else {
        return Err(wrong_tile(TileKind::SinkTable));
    };
    if *clean_plates == 0 {
        return Err(ActionError::NoCleanPlates);
    }
    *clean_plates -= 1;
    *hand = Some(Item::Plate(Plate::clean()));
    Ok(())
}

fn put_dirty_plate_in_sink(hand: &mut Option<Item>, tile: &mut Tile) -> Result<(), ActionError> {
    if !matches!(hand, Some(Item::Plate(plate)) if plate.dirty) {
        return Err(ActionError::NotHoldingDirtyPlate);
    }
    let Tile::Sink { dirty_plates, .. } = tile else {
        return Err(wrong_tile(TileKind::Sink));
    };
    *dirty_plates += 1;
    *hand = None;
    Ok(())
}

fn wash_sink(tile: &mut Tile) -> Result<(), ActionError> {
    let Tile::Sink {
        dirty_plates,
        in_use,
        ..
    } = tile
    else {
        return Err(wrong_tile(TileKind::Sink));
    };
    if *dirty_plates == 0 {
        return Err(ActionError::NoDirtyPlates);
    }
    *in_use = true;
    Ok(())
}

fn trash(hand: &mut Option<Item>, tile: &Tile) -> Result<(), ActionError> {
    let Some(held) = hand.as_ref() else {
        return Err(ActionError::HandsEmpty);
    };
    if tile.kind() != TileKind::Trash {
        return Err(wrong_tile(TileKind::Trash));
    }
    *hand = held.emptied();
    Ok(())
}

const fn wrong_tile(expected: TileKind) -> ActionError {
    ActionError::WrongTile { expected }
}

/// Food in `pan` that advances with every cook tick.
pub(crate) fn cooking_food(pan: &Pan) -> Option<&Food> {
    pan.food.as_ref().filter(|food| food.can_cook())
}

/// Stage a cooking food has reached after `progress` ticks. Stages never regress.
pub(crate) fn advanced_stage(food: &Food, progress: u32, rules: &Rules) -> CookStage {
    food.cooked_stage
        .max(CookStage::for_progress(progress, rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookoff_core::FoodType;

    fn food(kind: FoodType) -> Item {
        Item::Food(Food::new(kind))
    }

    fn cooker_with_pan() -> Tile {
        Tile::Cooker {
            pan: Some(Pan::empty()),
            cook_progress: 0,
        }
    }

    #[test]
    fn box_pickup_yields_copies_until_empty() {
        let mut tile = Tile::Box {
            item: Some(food(FoodType::Egg)),
            count: 2,
        };
        let mut hand = None;
        pickup(&mut hand, &mut tile).expect("first");
        assert_eq!(hand, Some(food(FoodType::Egg)));
        hand = None;
        pickup(&mut hand, &mut tile).expect("second");
        assert_eq!(
            tile,
            Tile::Box {
                item: None,
                count: 0
            }
        );
        hand = None;
        assert_eq!(pickup(&mut hand, &mut tile), Err(ActionError::BoxEmpty));
    }

    #[test]
    fn box_rejects_items_with_different_signature() {
        let mut tile = Tile::Box {
            item: Some(food(FoodType::Meat)),
            count: 1,
        };
        let rules = Rules::default();
        let mut hand = Some(Item::Food(Food {
            chopped: true,
            ..Food::new(FoodType::Meat)
        }));
        assert_eq!(
            place(&mut hand, &mut tile, &rules),
            Err(ActionError::BoxMismatch)
        );
        assert!(hand.is_some(), "rejected item stays in hand");

        let mut hand = Some(food(FoodType::Meat));
        place(&mut hand, &mut tile, &rules).expect("matching signature");
        assert_eq!(
            tile,
            Tile::Box {
                item: Some(food(FoodType::Meat)),
                count: 2
            }
        );
    }

    #[test]
    fn placing_food_on_cooker_resumes_from_stage() {
        let rules = Rules::default();
        let mut tile = cooker_with_pan();
        let mut hand = Some(Item::Food(Food {
            cooked_stage: CookStage::Cooked,
            ..Food::new(FoodType::Egg)
        }));
        place(&mut hand, &mut tile, &rules).expect("place");
        assert!(hand.is_none());
        let Tile::Cooker { cook_progress, .. } = tile else {
            panic!("cooker expected");
        };
        assert_eq!(cook_progress, rules.cook_progress);
    }

    #[test]
    fn pan_swap_refuses_busy_cooker() {
        let rules = Rules::default();
        let mut tile = Tile::Cooker {
            pan: Some(Pan {
                food: Some(Food::new(FoodType::Egg)),
            }),
            cook_progress: 3,
        };
        let mut hand = Some(Item::Pan(Pan::empty()));
        assert_eq!(
            place(&mut hand, &mut tile, &rules),
            Err(ActionError::CookerBusy)
        );
        assert_eq!(hand, Some(Item::Pan(Pan::empty())));
    }

    #[test]
    fn pan_swap_hands_back_resident_pan() {
        let rules = Rules::default();
        let mut tile = cooker_with_pan();
        let incoming = Pan {
            food: Some(Food::new(FoodType::Meat)),
        };
        let mut hand = Some(Item::Pan(incoming.clone()));
        place(&mut hand, &mut tile, &rules).expect("swap");
        assert_eq!(hand, Some(Item::Pan(Pan::empty())));
        assert_eq!(
            tile,
            Tile::Cooker {
                pan: Some(incoming),
                cook_progress: 0
            }
        );
    }

    #[test]
    fn chop_requires_counter_and_choppable_food() {
        let mut tile = Tile::Counter {
            item: Some(food(FoodType::Egg)),
        };
        assert_eq!(chop(&None, &mut tile), Err(ActionError::NotChoppable));
        let mut tile = Tile::Counter {
            item: Some(food(FoodType::Onions)),
        };
        chop(&None, &mut tile).expect("chop");
        assert_eq!(chop(&None, &mut tile), Err(ActionError::AlreadyChopped));
        assert_eq!(
            chop(&None, &mut Tile::Floor),
            Err(ActionError::WrongTile {
                expected: TileKind::Counter
            })
        );
    }

    #[test]
    fn take_from_pan_resets_progress() {
        let mut tile = Tile::Cooker {
            pan: Some(Pan {
                food: Some(Food {
                    cooked_stage: CookStage::Burnt,
                    ..Food::new(FoodType::Egg)
                }),
            }),
            cook_progress: 45,
        };
        let mut hand = None;
        take_from_pan(&mut hand, &mut tile).expect("take");
        assert_eq!(
            tile,
            Tile::Cooker {
                pan: Some(Pan::empty()),
                cook_progress: 0
            }
        );
    }

    #[test]
    fn buy_checks_menu_and_funds_before_debiting() {
        let mut shop = Tile::Shop {
            menu: vec![Buyable::Plate],
        };
        let mut money = 10;
        let mut hand = None;
        assert_eq!(
            buy(&mut hand, &mut shop, Buyable::Pan, &mut money),
            Err(ActionError::NotOnMenu)
        );
        assert_eq!(money, 10);
        buy(&mut hand, &mut shop, Buyable::Plate, &mut money).expect("buy");
        assert_eq!(money, 8);
        assert_eq!(hand, Some(Item::Plate(Plate::clean())));

        let mut broke = 1;
        let mut hand = None;
        assert_eq!(
            buy(&mut hand, &mut shop, Buyable::Plate, &mut broke),
            Err(ActionError::InsufficientFunds)
        );
        assert_eq!(broke, 1);
    }

    #[test]
    fn plating_works_in_both_directions() {
        let mut counter = Tile::Counter {
            item: Some(food(FoodType::Noodles)),
        };
        let mut hand = Some(Item::Plate(Plate::clean()));
        add_food_to_plate(&mut hand, &mut counter).expect("plate in hand");
        assert_eq!(counter, Tile::Counter { item: None });

        let mut counter = Tile::Counter { item: hand.take() };
        let mut hand = Some(food(FoodType::Sauce));
        add_food_to_plate(&mut hand, &mut counter).expect("plate on counter");
        assert!(hand.is_none());
        let Some(Item::Plate(plate)) = counter.item() else {
            panic!("plate expected on counter");
        };
        assert_eq!(plate.foods.len(), 2);
    }

    #[test]
    fn dirty_plates_refuse_food() {
        let mut counter = Tile::Counter {
            item: Some(food(FoodType::Noodles)),
        };
        let mut hand = Some(Item::Plate(Plate {
            foods: Vec::new(),
            dirty: true,
        }));
        assert_eq!(
            add_food_to_plate(&mut hand, &mut counter),
            Err(ActionError::PlateDirty)
        );
    }

    #[test]
    fn trash_restores_containers() {
        let mut hand = Some(Item::Plate(Plate {
            foods: vec![Food::new(FoodType::Egg)],
            dirty: true,
        }));
        trash(&mut hand, &Tile::Trash).expect("trash");
        assert_eq!(hand, Some(Item::Plate(Plate::clean())));
        let mut hand = Some(food(FoodType::Egg));
        trash(&mut hand, &Tile::Trash).expect("trash food");
        assert_eq!(hand, None);
    }

    #[test]
    fn sink_flow_moves_plates() {
        let mut sink = Tile::empty(TileKind::Sink);
        assert_eq!(wash_sink(&mut sink), Err(ActionError::NoDirtyPlates));
        let mut hand = Some(Item::Plate(Plate {
            foods: Vec::new(),
            dirty: true,
        }));
        put_dirty_plate_in_sink(&mut hand, &mut sink).expect("drop plate");
        wash_sink(&mut sink).expect("wash");
        assert_eq!(
            sink,
            Tile::Sink {
                dirty_plates: 1,
                in_use: true,
                wash_progress: 0
            }
        );
        let mut table = Tile::SinkTable { clean_plates: 1 };
        take_clean_plate(&mut hand, &mut table).expect("take plate");
        assert_eq!(table, Tile::SinkTable { clean_plates: 0 });
    }
}
