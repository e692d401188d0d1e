use std::{fs, path::Path, path::PathBuf};

use cookoff_core::{Event, PerTeam, Rules, Team};
use cookoff_world::WorldSnapshot;
use serde::Serialize;
use thiserror::Error;

use crate::TurnOutcome;

/// Failures while exporting a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The replay could not be encoded as JSON.
    #[error("failed to encode replay")]
    Encode(#[from] serde_json::Error),
    /// The encoded replay could not be written.
    #[error("failed to write replay to {path}")]
    Write {
        /// Destination that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// State of the match at the end of one turn.
#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    /// Full world state after both agents played.
    pub snapshot: WorldSnapshot,
    /// Events raised during the turn, tick first, then blue, then red.
    pub events: Vec<Event>,
    /// How each agent's invocation ended.
    pub outcomes: PerTeam<TurnOutcome>,
}

/// Complete match recording.
#[derive(Clone, Debug, Serialize)]
pub struct Replay {
    /// Winning team, `None` for a draw.
    pub winner: Option<Team>,
    /// Turns played.
    pub turns: u32,
    /// First turn of the switch window.
    pub switch_turn_start: u32,
    /// First turn after the switch window.
    pub switch_turn_end: u32,
    /// One frame per played turn.
    pub replay: Vec<Frame>,
}

impl Replay {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            winner: None,
            turns: 0,
            switch_turn_start: rules.switch_turn,
            switch_turn_end: rules.switch_window_end(),
            replay: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, frame: Frame) {
        self.turns = frame.snapshot.turn;
        self.replay.push(frame);
    }

    /// Encodes the replay as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the replay as indented JSON to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ReplayError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|source| ReplayError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
