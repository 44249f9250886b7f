//! Battle simulator binary.
//!
//! Composition root: loads content, builds the runtime, lets [`AutoPlayer`]
//! play every player turn and prints the outcome.
//!
//! ```bash
//! cargo run -p battle-sim -- --seed 42
//! cargo run -p battle-sim -- --roster my_roster.ron --pace-ms 200 --json
//! ```

mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, ContentFactory, Roster, RosterLoader};
use battle_core::{BattleOutcome, StatSource};
use battle_runtime::{AutoPlayer, BattleRuntime, PacedActorAction, RuntimeConfig};
use clap::Parser;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "battle-sim", about = "Run one turn-based battle to completion")]
struct Args {
    /// RON roster; defaults to the bundled one
    #[arg(long)]
    roster: Option<PathBuf>,

    /// TOML battle config; defaults to the bundled one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Battle seed (overrides BATTLE_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Players use strong attacks
    #[arg(long)]
    strong: bool,

    /// Time each Actor Action takes; 0 completes actions inline
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    outcome: BattleOutcome,
    combatants: Vec<CombatantLine>,
}

#[derive(Debug, Serialize)]
struct CombatantLine {
    name: String,
    monster: bool,
    hp: u32,
    max_hp: u32,
    exp: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = logging::setup_logging()?;

    let bundled = ContentFactory::bundled();
    let battle_config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => bundled.load_config()?,
    };
    let roster = match &args.roster {
        Some(path) => RosterLoader::load(path)?,
        None => bundled.load_roster()?,
    };

    let mut config = RuntimeConfig::default()
        .with_battle(battle_config)
        .with_env_overrides();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut player = AutoPlayer::new();
    if args.strong {
        player = player.with_strong_attacks();
    }

    let mut builder = BattleRuntime::builder()
        .config(config)
        .registry(roster.registry())
        .player_provider(player);
    if args.pace_ms > 0 {
        builder = builder.default_actor(PacedActorAction(Duration::from_millis(args.pace_ms)));
    }
    let mut runtime = builder.build().await?;

    tracing::info!(seed = runtime.seed(), combatants = roster.len(), "starting battle");
    let outcome = runtime
        .run_until_finished()
        .await
        .context("battle did not finish")?;
    let summary = summarize(runtime.seed(), outcome, &roster);
    runtime.shutdown().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn summarize(seed: u64, outcome: BattleOutcome, roster: &Roster) -> Summary {
    Summary {
        seed,
        outcome,
        combatants: roster
            .sheets()
            .iter()
            .map(|sheet| CombatantLine {
                name: sheet.name().to_owned(),
                monster: sheet.is_monster(),
                hp: sheet.hp(),
                max_hp: sheet.max_hp(),
                exp: sheet.exp(),
            })
            .collect(),
    }
}

fn print_summary(summary: &Summary) {
    println!("seed {}: {}", summary.seed, summary.outcome.as_str());
    if let BattleOutcome::Victory(report) = &summary.outcome {
        for reward in &report.rewards {
            println!(
                "  reward: {} x{} ({} exp)",
                reward.name, reward.quantity, reward.exp_value
            );
        }
        println!("  total exp: {}", report.total_exp);
    }
    for line in &summary.combatants {
        let side = if line.monster { "monster" } else { "player" };
        println!(
            "  {:<16} {:<8} {:>4}/{:<4} exp {}",
            line.name, side, line.hp, line.max_hp, line.exp
        );
    }
}
