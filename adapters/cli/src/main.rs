#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Cookoff match between two built-in agents.

mod agents;
mod config;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use cookoff_core::{PerTeam, Team};
use cookoff_system_match::MatchDriver;
use cookoff_world::{fixtures, MatchSetup, World};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{agents::AgentKind, config::FileConfig};

/// Plays one match and prints the result as JSON.
#[derive(Debug, Parser)]
#[command(name = "cookoff", version, about = "Two-team cooperative kitchen match runner")]
struct Cli {
    /// JSON match setup (kitchens, orders, spawns). Defaults to the built-in demo kitchen.
    #[arg(long)]
    setup: Option<PathBuf>,

    /// TOML file with `[rules]` and `[match]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Agent playing the red team.
    #[arg(long, value_enum, default_value_t = AgentKind::Wander)]
    red: AgentKind,

    /// Agent playing the blue team.
    #[arg(long, value_enum, default_value_t = AgentKind::Wander)]
    blue: AgentKind,

    /// Turn limit, overriding the configuration.
    #[arg(long)]
    turns: Option<u32>,

    /// Per-turn agent time limit in milliseconds, overriding the configuration.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Where to write the replay JSON. No replay is kept when omitted.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seed for the built-in agents.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log))
        .with_context(|| format!("invalid log filter `{}`", cli.log))?;
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut match_config = file_config.match_config();
    if let Some(turns) = cli.turns {
        match_config.turn_limit = turns;
    }
    if let Some(timeout) = cli.timeout_ms {
        match_config.per_turn_timeout = Duration::from_millis(timeout);
    }
    match_config.record_replay = match_config.record_replay && cli.replay.is_some();

    let setup = match &cli.setup {
        Some(path) => load_setup(path)?,
        None => fixtures::demo_setup(),
    };
    let world = World::new(setup, file_config.rules).context("invalid match setup")?;

    info!(
        red = ?cli.red,
        blue = ?cli.blue,
        turns = match_config.turn_limit,
        seed = cli.seed,
        "starting match"
    );
    let factories = PerTeam::new(
        cli.red.factory(cli.seed, Team::Red),
        cli.blue.factory(cli.seed, Team::Blue),
    );
    let report = MatchDriver::new(world, match_config, factories).run();

    if let (Some(path), Some(replay)) = (&cli.replay, &report.replay) {
        replay
            .write_to(path)
            .with_context(|| format!("failed to export replay to {}", path.display()))?;
        info!(path = %path.display(), frames = replay.replay.len(), "replay written");
    }

    let summary =
        serde_json::to_string_pretty(&report.result).context("failed to encode match result")?;
    println!("{summary}");
    Ok(())
}

fn load_setup(path: &Path) -> Result<MatchSetup> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read match setup {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse match setup {}", path.display()))
}
