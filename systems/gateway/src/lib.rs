#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Capability-gated action gateway handed to each team's agent.
//!
//! A [`Gateway`] is the only way agent code can observe or change the world. It enforces
//! ownership, the one-move-one-action budget of every bot, Chebyshev reach and the turn
//! deadline, then forwards the request to the world as a command. Failures never escape as
//! errors: they are logged as warnings and reported as `false`.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Instant,
};

use cookoff_core::{
    Action, ActionError, BotId, BotSnapshot, Buyable, CellCoord, Command, Event, KitchenMap,
    OrderId, OrderSnapshot, SwitchInfo, Team, Tile,
};
use cookoff_world::{apply, query, World};
use tracing::warn;

/// World handle shared by both gateways and the match driver.
pub type SharedWorld = Arc<Mutex<World>>;

/// Wraps a world so it can be shared with gateways.
#[must_use]
pub fn share(world: World) -> SharedWorld {
    Arc::new(Mutex::new(world))
}

/// Locks the shared world, recovering the state if a previous holder panicked.
pub fn lock(world: &SharedWorld) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Revocable permission for a gateway to keep touching the world.
///
/// The match driver revokes the token of a turn that overran its deadline so an abandoned
/// agent thread can no longer act.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently revokes the token.
    pub fn revoke(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Reports whether the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Budget {
    moves: u32,
    actions: u32,
}

impl Budget {
    const FULL: Self = Self {
        moves: 1,
        actions: 1,
    };
}

/// Per-team controller through which an agent plays.
#[derive(Debug)]
pub struct Gateway {
    team: Team,
    world: SharedWorld,
    budgets: BTreeMap<BotId, Budget>,
    deadline: Option<Instant>,
    token: CancelToken,
    journal: Vec<Event>,
}

impl Gateway {
    /// Creates the gateway for `team`. Bots have no budget until [`Gateway::begin_turn`].
    #[must_use]
    pub fn new(team: Team, world: SharedWorld) -> Self {
        Self {
            team,
            world,
            budgets: BTreeMap::new(),
            deadline: None,
            token: CancelToken::new(),
            journal: Vec::new(),
        }
    }

    /// Opens a new turn: refills every bot's budget, arms the deadline and issues a fresh
    /// cancellation token, which is returned to the caller.
    pub fn begin_turn(&mut self, deadline: Option<Instant>) -> CancelToken {
        self.reset_budgets();
        self.deadline = deadline;
        self.token = CancelToken::new();
        self.token.clone()
    }

    /// Gives every bot of the team exactly one move and one action.
    pub fn reset_budgets(&mut self) {
        let bots = query::team_bot_ids(&lock(&self.world), self.team);
        self.budgets = bots.into_iter().map(|bot| (bot, Budget::FULL)).collect();
    }

    /// Token guarding the current turn.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Takes every event caused through this gateway since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    /// Moves left for `bot` this turn.
    #[must_use]
    pub fn moves_left(&self, bot: BotId) -> u32 {
        self.budgets.get(&bot).map_or(0, |budget| budget.moves)
    }

    /// Actions left for `bot` this turn.
    #[must_use]
    pub fn actions_left(&self, bot: BotId) -> u32 {
        self.budgets.get(&bot).map_or(0, |budget| budget.actions)
    }

    // Observation.

    /// Team this gateway controls.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// The opposing team.
    #[must_use]
    pub const fn enemy_team(&self) -> Team {
        self.team.opponent()
    }

    /// Current turn number.
    #[must_use]
    pub fn turn(&self) -> u32 {
        query::turn(&lock(&self.world))
    }

    /// Bots controlled by `team`.
    #[must_use]
    pub fn team_bot_ids(&self, team: Team) -> Vec<BotId> {
        query::team_bot_ids(&lock(&self.world), team)
    }

    /// Balance of either team.
    #[must_use]
    pub fn team_money(&self, team: Team) -> i64 {
        query::team_money(&lock(&self.world), team)
    }

    /// Orders of either team.
    #[must_use]
    pub fn orders(&self, team: Team) -> Vec<OrderSnapshot> {
        query::orders(&lock(&self.world), team)
    }

    /// Copy of either team's kitchen.
    #[must_use]
    pub fn map(&self, team: Team) -> KitchenMap {
        query::map(&lock(&self.world), team)
    }

    /// Copy of one tile of either team's kitchen.
    #[must_use]
    pub fn tile(&self, team: Team, cell: CellCoord) -> Option<Tile> {
        query::tile(&lock(&self.world), team, cell)
    }

    /// View of an owned bot. Enemy and unknown bots yield `None`.
    #[must_use]
    pub fn bot_state(&self, bot: BotId) -> Option<BotSnapshot> {
        let world = lock(&self.world);
        match self.owned(&world, bot) {
            Ok(_) => query::bot_snapshot(&world, bot),
            Err(reason) => {
                warn!(team = %self.team, bot = bot.get(), %reason, "bot_state() refused");
                None
            }
        }
    }

    /// Switch window as seen by this team.
    #[must_use]
    pub fn switch_info(&self) -> SwitchInfo {
        query::switch_info(&lock(&self.world), self.team)
    }

    // Feasibility checks. None of these consume budget.

    /// Whether `bot` could step by `(dx, dy)` right now.
    #[must_use]
    pub fn can_move(&self, bot: BotId, dx: i32, dy: i32) -> bool {
        let world = lock(&self.world);
        self.owned(&world, bot).is_ok() && query::check_move(&world, bot, dx, dy).is_ok()
    }

    /// Whether `action` would succeed against `target` right now.
    #[must_use]
    pub fn can_act(&self, bot: BotId, action: Action, target: Option<CellCoord>) -> bool {
        let world = lock(&self.world);
        self.owned(&world, bot)
            .and_then(|origin| Self::reach(&world, origin, target))
            .and_then(|cell| query::check_action(&world, bot, action, cell))
            .is_ok()
    }

    /// Whether `bot` could put its held food into the pan at `target`.
    #[must_use]
    pub fn can_start_cook(&self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.can_act(bot, Action::StartCook, target)
    }

    /// Whether `bot` could buy `item` from the shop at `target`.
    #[must_use]
    pub fn can_buy(&self, bot: BotId, item: Buyable, target: Option<CellCoord>) -> bool {
        self.can_act(bot, Action::Buy(item), target)
    }

    /// Whether `bot` could submit its plate at `target` against an order.
    #[must_use]
    pub fn can_submit(&self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.can_act(bot, Action::Submit, target)
    }

    /// Whether this team may switch kitchens now.
    #[must_use]
    pub fn can_switch_maps(&self) -> bool {
        self.switch_info().can_switch()
    }

    // Mutation.

    /// Steps `bot` to one of its eight neighbours. Spends the move even on failure.
    pub fn move_bot(&mut self, bot: BotId, dx: i32, dy: i32) -> bool {
        let shared = Arc::clone(&self.world);
        let mut world = lock(&shared);
        let admitted = self
            .admit()
            .and_then(|()| self.owned(&world, bot).map(|_| ()))
            .and_then(|()| self.spend(bot, |budget| &mut budget.moves, ActionError::NoMovesLeft));
        if let Err(reason) = admitted {
            self.refuse_move(bot, reason);
            return false;
        }

        let mut events = Vec::new();
        apply(&mut world, Command::MoveBot { bot, dx, dy }, &mut events);
        let moved = events
            .iter()
            .any(|event| matches!(event, Event::BotMoved { .. }));
        for event in &events {
            if let Event::MoveRejected { reason, .. } = event {
                warn!(team = %self.team, bot = bot.get(), dx, dy, %reason, "move() failed");
            }
        }
        self.journal.extend(events);
        moved
    }

    /// Picks up the item at `target`, or one unit from a box.
    pub fn pickup(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::Pickup, target)
    }

    /// Puts the held item onto `target`.
    pub fn place(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::Place, target)
    }

    /// Chops the food on the counter at `target`.
    pub fn chop(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::Chop, target)
    }

    /// Puts the held cookable food into the empty pan at `target`.
    pub fn start_cook(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::StartCook, target)
    }

    /// Takes the food out of the pan at `target`.
    pub fn take_from_pan(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::TakeFromPan, target)
    }

    /// Buys `item` from the shop at `target` with team money.
    pub fn buy(&mut self, bot: BotId, item: Buyable, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::Buy(item), target)
    }

    /// Combines a plate and a food, one held and one on the counter at `target`.
    pub fn add_food_to_plate(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::AddFoodToPlate, target)
    }

    /// Takes a clean plate from the sink table at `target`.
    pub fn take_clean_plate(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::TakeCleanPlate, target)
    }

    /// Drops the held dirty plate into the sink at `target`.
    pub fn put_dirty_plate_in_sink(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::PutDirtyPlateInSink, target)
    }

    /// Washes at the sink at `target`; the plate is cleaned by the next tick.
    pub fn wash_sink(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::WashSink, target)
    }

    /// Throws the held item away at the trash at `target`.
    pub fn trash(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::Trash, target)
    }

    /// Submits the held plate at the station at `target`.
    pub fn submit(&mut self, bot: BotId, target: Option<CellCoord>) -> bool {
        self.act(bot, Action::Submit, target)
    }

    /// Moves every bot of the team onto the enemy kitchen. Consumes no budget.
    pub fn switch_maps(&mut self) -> bool {
        let shared = Arc::clone(&self.world);
        let mut world = lock(&shared);
        if let Err(reason) = self.admit() {
            warn!(team = %self.team, %reason, "switch_maps() refused");
            return false;
        }
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SwitchMaps { team: self.team },
            &mut events,
        );
        let switched = events
            .iter()
            .any(|event| matches!(event, Event::TeamSwitched { .. }));
        if let Some(Event::SwitchRejected { reason, .. }) = events.first() {
            warn!(team = %self.team, %reason, "switch_maps() failed");
        }
        self.journal.extend(events);
        switched
    }

    /// Records that `bot` is working on `order`. Consumes no budget.
    pub fn claim_order(&mut self, bot: BotId, order: OrderId) -> bool {
        self.set_claim(order, Some(bot))
    }

    /// Clears the claim on `order`. Consumes no budget.
    pub fn release_order(&mut self, order: OrderId) -> bool {
        self.set_claim(order, None)
    }

    fn set_claim(&mut self, order: OrderId, bot: Option<BotId>) -> bool {
        let shared = Arc::clone(&self.world);
        let mut world = lock(&shared);
        if let Err(reason) = self.admit() {
            warn!(team = %self.team, order = order.get(), %reason, "order claim refused");
            return false;
        }
        let mut events = Vec::new();
        let command = Command::ClaimOrder {
            team: self.team,
            order,
            bot,
        };
        apply(&mut world, command, &mut events);
        let claimed = events
            .iter()
            .any(|event| matches!(event, Event::OrderClaimed { .. }));
        if let Some(Event::ClaimRejected { reason, .. }) = events.first() {
            warn!(team = %self.team, order = order.get(), %reason, "order claim failed");
        }
        self.journal.extend(events);
        claimed
    }

    fn act(&mut self, bot: BotId, action: Action, target: Option<CellCoord>) -> bool {
        let shared = Arc::clone(&self.world);
        let mut world = lock(&shared);
        let resolved = self
            .admit()
            .and_then(|()| self.owned(&world, bot))
            .and_then(|origin| {
                self.spend(
                    bot,
                    |budget| &mut budget.actions,
                    ActionError::NoActionsLeft,
                )?;
                Self::reach(&world, origin, target)
            });
        let cell = match resolved {
            Ok(cell) => cell,
            Err(reason) => {
                self.refuse_action(bot, action, reason);
                return false;
            }
        };

        let mut events = Vec::new();
        apply(&mut world, Command::Act { bot, action, cell }, &mut events);
        let mut performed = false;
        for event in &events {
            match event {
                Event::ActionPerformed { .. } => performed = true,
                Event::ActionRejected { reason, .. } => {
                    warn!(
                        team = %self.team,
                        bot = bot.get(),
                        action = action.label(),
                        %cell,
                        %reason,
                        "action failed"
                    );
                }
                _ => {}
            }
        }
        self.journal.extend(events);
        performed
    }

    fn admit(&self) -> Result<(), ActionError> {
        if self.token.is_revoked() {
            return Err(ActionError::Revoked);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() > deadline) {
            return Err(ActionError::DeadlinePassed);
        }
        Ok(())
    }

    /// Resolves an owned bot to the kitchen and cell it stands on.
    fn owned(&self, world: &World, bot: BotId) -> Result<(Team, CellCoord), ActionError> {
        let found = query::bot(world, bot).ok_or(ActionError::UnknownBot)?;
        if found.team() != self.team {
            return Err(ActionError::ForeignBot);
        }
        Ok((found.map_team(), found.cell()))
    }

    /// Resolves an optional target to a cell within reach, defaulting to the bot's own cell.
    fn reach(
        world: &World,
        (map_team, origin): (Team, CellCoord),
        target: Option<CellCoord>,
    ) -> Result<CellCoord, ActionError> {
        let cell = target.unwrap_or(origin);
        if !origin.is_adjacent(cell) {
            return Err(ActionError::TooFar);
        }
        if !query::in_bounds(world, map_team, cell) {
            return Err(ActionError::OutOfBounds);
        }
        Ok(cell)
    }

    fn spend(
        &mut self,
        bot: BotId,
        counter: impl FnOnce(&mut Budget) -> &mut u32,
        exhausted: ActionError,
    ) -> Result<(), ActionError> {
        let left = self
            .budgets
            .get_mut(&bot)
            .map(counter)
            .filter(|left| **left > 0)
            .ok_or(exhausted)?;
        *left -= 1;
        Ok(())
    }

    fn refuse_move(&mut self, bot: BotId, reason: ActionError) {
        warn!(team = %self.team, bot = bot.get(), %reason, "move() refused");
        self.journal.push(Event::MoveRejected { bot, reason });
    }

    fn refuse_action(&mut self, bot: BotId, action: Action, reason: ActionError) {
        warn!(
            team = %self.team,
            bot = bot.get(),
            action = action.label(),
            %reason,
            "action refused"
        );
        self.journal.push(Event::ActionRejected {
            bot,
            action,
            reason,
        });
    }
}
