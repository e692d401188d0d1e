#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduler that plays a whole match between two agents.
//!
//! Every turn the driver ticks the world, then lets the blue agent and the red agent play in
//! that order, each on a supervised worker thread. An agent that returns an error, panics or
//! overruns its time limit forfeits the match. When the turn limit is reached the richer team
//! wins and equal balances are a draw.

mod replay;
mod watchdog;

use std::{
    ops::ControlFlow,
    panic::{self, AssertUnwindSafe},
    time::Duration,
};

use cookoff_core::{Command, Event, KitchenMap, PerTeam, Team};
use cookoff_system_gateway::{lock, share, Gateway, SharedWorld};
use cookoff_world::{apply, query, World};
use serde::Serialize;
use tracing::{info, warn};

use crate::watchdog::{panic_message, Seat, Watchdog};

pub use replay::{Frame, Replay, ReplayError};

/// Team-side decision logic. The driver calls it once per turn.
pub trait Agent: Send {
    /// Plays one turn through the team's gateway. An `Err` forfeits the match.
    fn play_turn(&mut self, gateway: &mut Gateway) -> anyhow::Result<()>;
}

/// Builds an agent from a copy of its team's home kitchen.
pub type AgentFactory = Box<dyn FnOnce(&KitchenMap) -> anyhow::Result<Box<dyn Agent>>>;

/// Match-level settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Last turn to play.
    pub turn_limit: u32,
    /// Wall-clock limit for one agent invocation.
    pub per_turn_timeout: Duration,
    /// Whether to keep a full-state frame for every turn.
    pub record_replay: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            turn_limit: 500,
            per_turn_timeout: Duration::from_millis(500),
            record_replay: true,
        }
    }
}

/// How one agent invocation ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The agent returned normally.
    Completed,
    /// The agent returned an error or panicked.
    Crashed {
        /// Rendered error or panic message.
        reason: String,
    },
    /// The agent overran the time limit and was abandoned.
    TimedOut,
    /// The agent never started because its construction failed.
    NotInitialized,
}

impl TurnOutcome {
    /// Reports whether the outcome forfeits the match.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Summary of a finished turn, handed to the per-turn observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    /// Turn that was played.
    pub turn: u32,
    /// How each agent's invocation ended.
    pub outcomes: PerTeam<TurnOutcome>,
    /// Balances after both agents played.
    pub money: PerTeam<i64>,
    /// Events raised during the turn, tick first, then blue, then red.
    pub events: Vec<Event>,
}

/// Why the match stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEnding {
    /// The turn limit was reached and money decided.
    TurnLimit,
    /// One agent faulted and lost.
    Forfeit {
        /// Team that faulted.
        loser: Team,
    },
    /// Both agents faulted on the same turn.
    DoubleForfeit,
    /// Neither agent could be constructed.
    BothFailedInit,
    /// The observer stopped the match early; money decided.
    Aborted,
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Winning team, `None` for a draw.
    pub winner: Option<Team>,
    /// Turns played.
    pub turns_played: u32,
    /// Why the match stopped.
    pub ending: MatchEnding,
    /// Red's final balance.
    pub red_money: i64,
    /// Blue's final balance.
    pub blue_money: i64,
}

/// Result of a match together with its recording.
#[derive(Clone, Debug)]
pub struct MatchReport {
    /// Final result.
    pub result: MatchResult,
    /// Recording, when enabled in the configuration.
    pub replay: Option<Replay>,
}

enum SeatState {
    Ready(Seat),
    Failed,
}

/// Owns the world and both agents for the duration of a match.
pub struct MatchDriver {
    world: SharedWorld,
    config: MatchConfig,
    watchdog: Watchdog,
    seats: PerTeam<SeatState>,
}

impl std::fmt::Debug for MatchDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MatchDriver {
    /// Spawns every team's bots on its spawn cells, red first, then constructs both agents.
    ///
    /// A factory that fails or panics leaves its team forfeiting every turn.
    #[must_use]
    pub fn new(mut world: World, config: MatchConfig, factories: PerTeam<AgentFactory>) -> Self {
        let mut events = Vec::new();
        for team in [Team::Red, Team::Blue] {
            for cell in query::spawn_cells(&world, team).to_vec() {
                apply(&mut world, Command::SpawnBot { team, cell }, &mut events);
            }
        }
        let homes = PerTeam::new(
            query::map(&world, Team::Red),
            query::map(&world, Team::Blue),
        );
        let world = share(world);

        let PerTeam { red, blue } = factories;
        let seats = PerTeam::new(
            Self::build_seat(Team::Red, red, &homes.red, &world),
            Self::build_seat(Team::Blue, blue, &homes.blue, &world),
        );

        Self {
            watchdog: Watchdog::new(config.per_turn_timeout),
            world,
            config,
            seats,
        }
    }

    fn build_seat(
        team: Team,
        factory: AgentFactory,
        home: &KitchenMap,
        world: &SharedWorld,
    ) -> SeatState {
        let built = panic::catch_unwind(AssertUnwindSafe(|| factory(home)));
        let failure = match built {
            Ok(Ok(agent)) => {
                return SeatState::Ready(Seat {
                    agent,
                    gateway: Gateway::new(team, world.clone()),
                });
            }
            Ok(Err(error)) => format!("{error:#}"),
            Err(payload) => panic_message(payload.as_ref()),
        };
        warn!(%team, reason = %failure, "agent failed to initialise");
        SeatState::Failed
    }

    /// Shared handle to the world being played.
    #[must_use]
    pub fn world(&self) -> SharedWorld {
        self.world.clone()
    }

    /// Plays the match to completion.
    #[must_use]
    pub fn run(self) -> MatchReport {
        self.run_with(|_, _| ControlFlow::Continue(()))
    }

    /// Plays the match, calling `observer` after every turn. Returning
    /// [`ControlFlow::Break`] stops the match, which is then scored on money.
    pub fn run_with<F>(mut self, mut observer: F) -> MatchReport
    where
        F: FnMut(&TurnReport, &World) -> ControlFlow<()>,
    {
        let rules = query::rules(&lock(&self.world)).clone();
        let mut replay = self.config.record_replay.then(|| Replay::new(&rules));

        if matches!(
            (&self.seats.red, &self.seats.blue),
            (SeatState::Failed, SeatState::Failed)
        ) {
            return self.finish(None, 0, MatchEnding::BothFailedInit, replay);
        }

        for _ in 0..self.config.turn_limit {
            let report = self.play_turn();
            let turn = report.turn;

            if let Some(replay) = replay.as_mut() {
                let snapshot = query::snapshot(&lock(&self.world));
                replay.record(Frame {
                    snapshot,
                    events: report.events.clone(),
                    outcomes: report.outcomes.clone(),
                });
            }

            let flow = observer(&report, &lock(&self.world));

            match (report.outcomes.red.is_fault(), report.outcomes.blue.is_fault()) {
                (true, true) => {
                    return self.finish(None, turn, MatchEnding::DoubleForfeit, replay);
                }
                (true, false) => {
                    let ending = MatchEnding::Forfeit { loser: Team::Red };
                    return self.finish(Some(Team::Blue), turn, ending, replay);
                }
                (false, true) => {
                    let ending = MatchEnding::Forfeit { loser: Team::Blue };
                    return self.finish(Some(Team::Red), turn, ending, replay);
                }
                (false, false) => {}
            }

            if flow.is_break() {
                let winner = self.richer_team();
                return self.finish(winner, turn, MatchEnding::Aborted, replay);
            }
        }

        let turns = query::turn(&lock(&self.world));
        let winner = self.richer_team();
        self.finish(winner, turns, MatchEnding::TurnLimit, replay)
    }

    fn play_turn(&mut self) -> TurnReport {
        let mut events = Vec::new();
        let turn = {
            let mut world = lock(&self.world);
            apply(&mut world, Command::StartTurn, &mut events);
            query::turn(&world)
        };

        let mut outcomes = PerTeam::new(TurnOutcome::NotInitialized, TurnOutcome::NotInitialized);
        for team in Team::TURN_ORDER {
            let seat = std::mem::replace(self.seats.get_mut(team), SeatState::Failed);
            let SeatState::Ready(seat) = seat else {
                continue;
            };
            let (returned, outcome) = self.watchdog.supervise(team, seat);
            if let Some(mut seat) = returned {
                events.extend(seat.gateway.drain_events());
                *self.seats.get_mut(team) = SeatState::Ready(seat);
            }
            if let TurnOutcome::Crashed { reason } = &outcome {
                warn!(%team, turn, %reason, "agent crashed");
            }
            *outcomes.get_mut(team) = outcome;
        }

        let world = lock(&self.world);
        TurnReport {
            turn,
            outcomes,
            money: PerTeam::new(
                query::team_money(&world, Team::Red),
                query::team_money(&world, Team::Blue),
            ),
            events,
        }
    }

    fn richer_team(&self) -> Option<Team> {
        let world = lock(&self.world);
        let red = query::team_money(&world, Team::Red);
        let blue = query::team_money(&world, Team::Blue);
        match red.cmp(&blue) {
            std::cmp::Ordering::Greater => Some(Team::Red),
            std::cmp::Ordering::Less => Some(Team::Blue),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn finish(
        self,
        winner: Option<Team>,
        turns_played: u32,
        ending: MatchEnding,
        mut replay: Option<Replay>,
    ) -> MatchReport {
        let world = lock(&self.world);
        let result = MatchResult {
            winner,
            turns_played,
            ending,
            red_money: query::team_money(&world, Team::Red),
            blue_money: query::team_money(&world, Team::Blue),
        };
        if let Some(replay) = replay.as_mut() {
            replay.winner = winner;
        }
        info!(
            winner = winner.map_or("draw", Team::name),
            turns = turns_played,
            ?ending,
            red_money = result.red_money,
            blue_money = result.blue_money,
            "match finished"
        );
        MatchReport { result, replay }
    }
}
