//! Built-in agents so a match can be played without external bots.

use clap::ValueEnum;
use cookoff_core::{KitchenMap, Team};
use cookoff_system_gateway::Gateway;
use cookoff_system_match::{Agent, AgentFactory};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Agents selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum AgentKind {
    /// Never acts.
    Idle,
    /// Takes one random legal step per bot per turn and switches kitchens when allowed.
    Wander,
}

impl AgentKind {
    /// Factory for this agent; `seed` and `team` fix the random stream.
    pub(crate) fn factory(self, seed: u64, team: Team) -> AgentFactory {
        let stream = match team {
            Team::Red => 0,
            Team::Blue => 1,
        };
        Box::new(move |_: &KitchenMap| {
            let agent: Box<dyn Agent> = match self {
                Self::Idle => Box::new(Idle),
                Self::Wander => Box::new(Wander::new(seed, stream)),
            };
            Ok(agent)
        })
    }
}

struct Idle;

impl Agent for Idle {
    fn play_turn(&mut self, _gateway: &mut Gateway) -> anyhow::Result<()> {
        Ok(())
    }
}

struct Wander {
    rng: ChaCha8Rng,
}

impl Wander {
    fn new(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng }
    }
}

impl Agent for Wander {
    fn play_turn(&mut self, gateway: &mut Gateway) -> anyhow::Result<()> {
        if gateway.can_switch_maps() {
            let _ = gateway.switch_maps();
        }
        for bot in gateway.team_bot_ids(gateway.team()) {
            let open: Vec<(i32, i32)> = STEPS
                .iter()
                .copied()
                .filter(|&(dx, dy)| gateway.can_move(bot, dx, dy))
                .collect();
            if let Some(&(dx, dy)) = open.choose(&mut self.rng) {
                let _ = gateway.move_bot(bot, dx, dy);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use cookoff_core::{CellCoord, Event, PerTeam, Rules};
    use cookoff_system_match::{MatchConfig, MatchDriver, MatchEnding};
    use cookoff_world::{fixtures, query, World};

    use super::*;

    /// Plays a short demo match and returns red's final cells and its number of steps.
    fn play(seed: u64) -> (Vec<CellCoord>, usize) {
        let world = World::new(fixtures::demo_setup(), Rules::default()).expect("demo setup");
        let config = MatchConfig {
            turn_limit: 15,
            record_replay: false,
            ..MatchConfig::default()
        };
        let factories = PerTeam::new(
            AgentKind::Wander.factory(seed, Team::Red),
            AgentKind::Idle.factory(seed, Team::Blue),
        );
        let driver = MatchDriver::new(world, config, factories);
        let shared = driver.world();
        let mut steps = 0;
        let report = driver.run_with(|turn, _| {
            steps += turn
                .events
                .iter()
                .filter(|event| matches!(event, Event::BotMoved { .. }))
                .count();
            ControlFlow::Continue(())
        });
        assert_eq!(report.result.ending, MatchEnding::TurnLimit);

        let world = cookoff_system_gateway::lock(&shared);
        let cells = query::team_bot_ids(&world, Team::Red)
            .into_iter()
            .filter_map(|bot| query::bot(&world, bot).map(|bot| bot.cell()))
            .collect();
        (cells, steps)
    }

    #[test]
    fn wandering_is_reproducible_for_a_seed() {
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn wanderers_step_every_turn() {
        let (cells, steps) = play(3);
        assert_eq!(cells.len(), 2);
        assert_eq!(
            steps,
            30,
            "two bots, fifteen turns, always a free neighbour"
        );
    }
}
