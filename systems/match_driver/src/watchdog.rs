//! Runs one agent turn on a worker thread under a wall-clock limit.
//!
//! A worker that overruns the limit cannot be stopped from inside the process. Instead its
//! gateway token is revoked, so anything the abandoned thread attempts afterwards is refused
//! without touching the world, and the thread is left to finish on its own.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use cookoff_core::Team;
use cookoff_system_gateway::Gateway;
use tracing::warn;

use crate::{Agent, TurnOutcome};

/// An agent together with the gateway it plays through.
pub(crate) struct Seat {
    pub(crate) agent: Box<dyn Agent>,
    pub(crate) gateway: Gateway,
}

/// Per-turn supervisor for agent invocations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Watchdog {
    timeout: Duration,
}

impl Watchdog {
    pub(crate) const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Plays one turn for `team`. The seat comes back unless the worker was abandoned.
    pub(crate) fn supervise(&self, team: Team, mut seat: Seat) -> (Option<Seat>, TurnOutcome) {
        let token = seat.gateway.begin_turn(Some(Instant::now() + self.timeout));
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name(format!("agent-{}", team.name().to_lowercase()))
            .spawn(move || {
                let played = panic::catch_unwind(AssertUnwindSafe(|| {
                    seat.agent.play_turn(&mut seat.gateway)
                }));
                let outcome = match played {
                    Ok(Ok(())) => TurnOutcome::Completed,
                    Ok(Err(error)) => TurnOutcome::Crashed {
                        reason: format!("{error:#}"),
                    },
                    Err(payload) => TurnOutcome::Crashed {
                        reason: panic_message(payload.as_ref()),
                    },
                };
                // The scheduler may have stopped listening after a timeout.
                let _ = sender.send((seat, outcome));
            });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(error) => {
                return (
                    None,
                    TurnOutcome::Crashed {
                        reason: format!("could not start agent thread: {error}"),
                    },
                );
            }
        };

        match receiver.recv_timeout(self.timeout) {
            Ok((seat, outcome)) => {
                let _ = worker.join();
                (Some(seat), outcome)
            }
            Err(RecvTimeoutError::Timeout) => {
                token.revoke();
                warn!(
                    %team,
                    timeout_ms = self.timeout_ms(),
                    "agent timed out; worker abandoned"
                );
                (None, TurnOutcome::TimedOut)
            }
            Err(RecvTimeoutError::Disconnected) => (
                None,
                TurnOutcome::Crashed {
                    reason: "agent thread exited without reporting".to_owned(),
                },
            ),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_owned()
    }
}
