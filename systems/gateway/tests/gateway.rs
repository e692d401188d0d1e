use std::time::{Duration, Instant};

use cookoff_core::{
    Action, ActionError, BotId, Buyable, CellCoord, Command, Event, Food, FoodType, Item, ItemView,
    OrderId, Plate, Rules, Team, Tile,
};
use cookoff_system_gateway::{lock, share, Gateway, SharedWorld};
use cookoff_world::{apply, fixtures, query, MatchSetup, World};

const ROWS: [&str; 4] = ["#####", "#$.C#", "#...#", "#####"];
const RED_BOT: BotId = BotId::new(1);
const BLUE_BOT: BotId = BotId::new(2);

fn cell(x: u32, y: u32) -> CellCoord {
    CellCoord::new(x, y)
}

fn quiet_rules() -> Rules {
    Rules {
        money_per_turn: 0,
        ..Rules::default()
    }
}

fn shared_world(rows: &[&str], spawn: CellCoord, rules: Rules) -> SharedWorld {
    start(fixtures::mirrored_setup(rows, &[spawn]), rules)
}

/// Spawns every bot, red first, and opens turn 1.
fn start(setup: MatchSetup, rules: Rules) -> SharedWorld {
    let mut world = World::new(setup, rules).expect("valid setup");
    let mut events = Vec::new();
    for team in [Team::Red, Team::Blue] {
        for cell in query::spawn_cells(&world, team).to_vec() {
            apply(&mut world, Command::SpawnBot { team, cell }, &mut events);
        }
    }
    apply(&mut world, Command::StartTurn, &mut events);
    share(world)
}

fn gateways(rules: Rules) -> (SharedWorld, Gateway, Gateway) {
    let world = shared_world(&ROWS, cell(2, 2), rules);
    let mut red = Gateway::new(Team::Red, world.clone());
    let mut blue = Gateway::new(Team::Blue, world.clone());
    let _ = red.begin_turn(None);
    let _ = blue.begin_turn(None);
    (world, red, blue)
}

fn fund(world: &SharedWorld, team: Team, delta: i64) {
    let mut events = Vec::new();
    apply(
        &mut lock(world),
        Command::AdjustMoney { team, delta },
        &mut events,
    );
}

/// Ticks the world and opens a fresh turn on `gateway`.
fn next_turn(world: &SharedWorld, gateway: &mut Gateway) {
    let mut events = Vec::new();
    apply(&mut lock(world), Command::StartTurn, &mut events);
    let _ = gateway.begin_turn(None);
}

fn completed(gateway: &Gateway) -> Vec<OrderId> {
    gateway
        .orders(gateway.team())
        .into_iter()
        .filter(|order| order.completed_turn.is_some())
        .map(|order| order.order_id)
        .collect()
}

fn rejection(events: &[Event]) -> Option<ActionError> {
    events.iter().rev().find_map(|event| match event {
        Event::ActionRejected { reason, .. } | Event::MoveRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}

#[test]
fn bots_spawn_in_red_then_blue_order() {
    let (_, red, blue) = gateways(quiet_rules());
    assert_eq!(red.team_bot_ids(Team::Red), vec![RED_BOT]);
    assert_eq!(blue.team_bot_ids(Team::Blue), vec![BLUE_BOT]);
    assert_eq!(red.enemy_team(), Team::Blue);
}

#[test]
fn second_move_in_a_turn_is_refused() {
    let (_, mut red, _) = gateways(quiet_rules());

    assert!(red.move_bot(RED_BOT, 1, 0));
    assert_eq!(red.moves_left(RED_BOT), 0);
    assert!(!red.move_bot(RED_BOT, -1, 0));
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::NoMovesLeft)
    );

    let state = red.bot_state(RED_BOT).expect("own bot");
    assert_eq!(state.cell, cell(3, 2));
}

#[test]
fn blocked_move_still_spends_the_budget() {
    let (_, mut red, _) = gateways(quiet_rules());

    assert!(!red.move_bot(RED_BOT, 0, 1), "row 3 is wall");
    assert_eq!(red.moves_left(RED_BOT), 0);
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::NotWalkable)
    );
}

#[test]
fn foreign_and_unknown_bots_cost_nothing() {
    let (_, mut red, blue) = gateways(quiet_rules());

    assert!(!red.move_bot(BLUE_BOT, 1, 0));
    assert!(!red.chop(BLUE_BOT, None));
    assert!(!red.pickup(BotId::new(99), None));
    assert!(red.bot_state(BLUE_BOT).is_none());

    assert_eq!(red.moves_left(RED_BOT), 1);
    assert_eq!(red.actions_left(RED_BOT), 1);
    assert_eq!(blue.moves_left(BLUE_BOT), 1);
    assert_eq!(blue.actions_left(BLUE_BOT), 1);
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::UnknownBot)
    );
}

#[test]
fn buying_debits_team_money_and_spends_the_action() {
    let (world, mut red, _) = gateways(quiet_rules());
    fund(&world, Team::Red, 10);

    assert!(red.can_buy(RED_BOT, Buyable::Plate, Some(cell(1, 1))));
    assert!(red.buy(RED_BOT, Buyable::Plate, Some(cell(1, 1))));
    assert_eq!(red.team_money(Team::Red), 8);
    assert_eq!(red.team_money(Team::Blue), 0);

    let state = red.bot_state(RED_BOT).expect("own bot");
    assert!(matches!(state.holding, Some(ItemView::Plate { dirty: false, .. })));

    assert!(!red.place(RED_BOT, Some(cell(3, 1))));
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::NoActionsLeft)
    );
}

#[test]
fn failed_preconditions_still_spend_the_action() {
    let (_, mut red, _) = gateways(quiet_rules());

    assert!(!red.buy(RED_BOT, Buyable::Pan, Some(cell(1, 1))));
    assert_eq!(red.actions_left(RED_BOT), 0);
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::InsufficientFunds)
    );
    assert_eq!(red.team_money(Team::Red), 0);
}

#[test]
fn targets_outside_reach_are_refused() {
    let (_, mut red, _) = gateways(quiet_rules());
    assert!(red.move_bot(RED_BOT, 1, 0));

    assert!(!red.can_act(RED_BOT, Action::Buy(Buyable::Plate), Some(cell(1, 1))));
    assert!(!red.pickup(RED_BOT, Some(cell(1, 1))));
    assert_eq!(rejection(&red.drain_events()), Some(ActionError::TooFar));
}

#[test]
fn out_of_bounds_targets_are_refused() {
    let world = shared_world(&[".."], cell(0, 0), quiet_rules());
    let mut red = Gateway::new(Team::Red, world);
    let _ = red.begin_turn(None);

    assert!(!red.can_act(RED_BOT, Action::Pickup, Some(cell(0, 1))));
    assert!(!red.pickup(RED_BOT, Some(cell(0, 1))));
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::OutOfBounds)
    );
}

#[test]
fn action_defaults_to_the_bots_own_cell() {
    let (_, mut red, _) = gateways(quiet_rules());

    assert!(!red.pickup(RED_BOT, None));
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::NothingToPickUp)
    );
}

#[test]
fn revoked_gateway_cannot_act_and_keeps_its_budget() {
    let (world, mut red, _) = gateways(quiet_rules());
    let token = red.begin_turn(None);
    token.revoke();

    assert!(!red.move_bot(RED_BOT, 1, 0));
    assert!(!red.switch_maps());
    assert_eq!(red.moves_left(RED_BOT), 1);
    assert_eq!(rejection(&red.drain_events()), Some(ActionError::Revoked));

    let bot = query::bot_snapshot(&lock(&world), RED_BOT).expect("bot exists");
    assert_eq!(bot.cell, cell(2, 2));
}

#[test]
fn expired_deadline_refuses_every_mutation() {
    let (_, mut red, _) = gateways(quiet_rules());
    let past = Instant::now()
        .checked_sub(Duration::from_millis(5))
        .unwrap_or_else(Instant::now);
    let _ = red.begin_turn(Some(past));
    std::thread::sleep(Duration::from_millis(1));

    assert!(!red.move_bot(RED_BOT, 1, 0));
    assert_eq!(
        rejection(&red.drain_events()),
        Some(ActionError::DeadlinePassed)
    );
}

#[test]
fn switching_ignores_budgets_and_is_one_shot() {
    let rules = Rules {
        switch_turn: 1,
        switch_duration: 5,
        ..quiet_rules()
    };
    let (_, mut red, blue) = gateways(rules);

    assert!(red.can_switch_maps());
    assert!(red.move_bot(RED_BOT, 1, 0));
    assert!(red.switch_maps());
    assert!(!red.can_switch_maps());
    assert!(!red.switch_maps());

    let state = red.bot_state(RED_BOT).expect("own bot");
    assert_eq!(state.map_team, Team::Blue);
    assert!(blue.switch_info().enemy_team_switched);
    assert!(red
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::TeamSwitched { team: Team::Red, .. })));
}

#[test]
fn switching_outside_the_window_fails() {
    let (_, mut red, _) = gateways(quiet_rules());
    assert!(!red.can_switch_maps());
    assert!(!red.switch_maps());
}

#[test]
fn claims_are_advisory_and_free() {
    let (world, mut red, _) = gateways(quiet_rules());
    let command = Command::SpawnOrder {
        team: Team::Red,
        required: vec![FoodType::Egg],
        duration: 10,
        reward: 30,
        penalty: 0,
    };
    let mut events = Vec::new();
    apply(&mut lock(&world), command, &mut events);
    let order = red.orders(Team::Red)[0].order_id;

    assert!(red.claim_order(RED_BOT, order));
    assert_eq!(red.orders(Team::Red)[0].claimed_by, Some(RED_BOT));
    assert!(!red.claim_order(BLUE_BOT, order));
    assert!(red.release_order(order));
    assert_eq!(red.orders(Team::Red)[0].claimed_by, None);
    assert_eq!(red.actions_left(RED_BOT), 1);
}

#[test]
fn observations_are_copies() {
    let (world, red, _) = gateways(quiet_rules());
    let mut map = red.map(Team::Red);
    let _ = map.set_tile(cell(2, 2), Tile::Wall);

    assert_eq!(
        query::tile(&lock(&world), Team::Red, cell(2, 2)),
        Some(Tile::Floor)
    );
    assert_eq!(red.turn(), 1);
}

#[test]
fn full_dish_is_bought_cooked_plated_and_served() {
    const KITCHEN: [&str; 5] = ["#####", "#$CK#", "#...#", "#UC.#", "#####"];
    let (shop, board, cooker, pass, submit) =
        (cell(1, 1), cell(2, 1), cell(3, 1), cell(2, 3), cell(1, 3));
    let mut setup = fixtures::mirrored_setup(&KITCHEN, &[cell(2, 2)]);
    setup.red.orders = vec![fixtures::order(1, &[FoodType::Meat], 0, 50, 150)];
    let rules = Rules {
        cook_progress: 2,
        burn_progress: 50,
        ..quiet_rules()
    };
    let world = start(setup, rules);
    fund(&world, Team::Red, 100);
    let mut red = Gateway::new(Team::Red, world.clone());
    let _ = red.begin_turn(None);

    assert!(red.buy(RED_BOT, Buyable::Food(FoodType::Meat), Some(shop)));
    next_turn(&world, &mut red);
    assert!(red.place(RED_BOT, Some(board)));
    next_turn(&world, &mut red);
    assert!(red.chop(RED_BOT, Some(board)));
    next_turn(&world, &mut red);
    assert!(red.pickup(RED_BOT, Some(board)));
    next_turn(&world, &mut red);
    assert!(red.can_start_cook(RED_BOT, Some(cooker)));
    assert!(red.start_cook(RED_BOT, Some(cooker)));
    next_turn(&world, &mut red);
    assert!(red.buy(RED_BOT, Buyable::Plate, Some(shop)));
    next_turn(&world, &mut red);
    assert!(red.place(RED_BOT, Some(pass)));
    next_turn(&world, &mut red);
    assert!(red.take_from_pan(RED_BOT, Some(cooker)));
    next_turn(&world, &mut red);
    assert!(red.add_food_to_plate(RED_BOT, Some(pass)));
    next_turn(&world, &mut red);
    assert!(red.pickup(RED_BOT, Some(pass)));

    let state = red.bot_state(RED_BOT).expect("own bot");
    let Some(ItemView::Plate { dirty: false, food }) = state.holding else {
        panic!("expected a clean plate, got {:?}", state.holding);
    };
    assert_eq!(food.len(), 1);
    assert!(food[0].chopped);
    assert_eq!(food[0].cooked_stage, 1);

    next_turn(&world, &mut red);
    assert_eq!(red.team_money(Team::Red), 18);
    assert!(red.can_submit(RED_BOT, Some(submit)));
    assert!(red.submit(RED_BOT, Some(submit)));
    assert_eq!(red.team_money(Team::Red), 168);
    assert_eq!(completed(&red), vec![OrderId::new(1)]);
    assert!(red.drain_events().contains(&Event::OrderCompleted {
        team: Team::Red,
        order: OrderId::new(1),
        reward: 150,
        turn: 11,
    }));

    let state = red.bot_state(RED_BOT).expect("own bot");
    assert!(matches!(state.holding, Some(ItemView::Plate { dirty: true, .. })));
}

#[test]
fn submission_prefers_earliest_expiry_then_age_then_id() {
    const KITCHEN: [&str; 4] = ["#####", "#CUC#", "#...#", "#####"];
    let (left, right, submit) = (cell(1, 1), cell(3, 1), cell(2, 1));
    let (first, second) = (BotId::new(1), BotId::new(2));
    let mut setup = fixtures::mirrored_setup(&KITCHEN, &[cell(1, 2), cell(3, 2)]);
    let plated_egg = Tile::Counter {
        item: Some(Item::Plate(Plate {
            foods: vec![Food::new(FoodType::Egg)],
            ..Plate::clean()
        })),
    };
    assert!(setup.red.map.set_tile(left, plated_egg.clone()));
    assert!(setup.red.map.set_tile(right, plated_egg));
    setup.red.orders = vec![
        fixtures::order(1, &[FoodType::Egg], 1, 20, 10),
        fixtures::order(2, &[FoodType::Egg], 1, 20, 20),
        fixtures::order(3, &[FoodType::Egg], 0, 40, 30),
        fixtures::order(4, &[FoodType::Egg], 0, 20, 40),
    ];
    let world = start(setup, quiet_rules());
    let mut red = Gateway::new(Team::Red, world.clone());
    let _ = red.begin_turn(None);

    assert!(red.pickup(first, Some(left)));
    assert!(red.pickup(second, Some(right)));
    next_turn(&world, &mut red);

    assert!(red.submit(first, Some(submit)));
    assert_eq!(
        completed(&red),
        vec![OrderId::new(4)],
        "earliest expiry, then oldest"
    );
    assert!(red.submit(second, Some(submit)));
    assert_eq!(
        completed(&red),
        vec![OrderId::new(1), OrderId::new(4)],
        "equal expiry and age fall back to the lowest id"
    );
    assert_eq!(red.team_money(Team::Red), 50);
}
