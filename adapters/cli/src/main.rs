#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Bunny Hop programs headlessly.

mod program_text;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use bunny_hop_core::{GameState, LevelId, Outcome};
use bunny_hop_simulation::{RunReport, Session};
use bunny_hop_world::{query, LevelCatalog, World};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::program_text::parse_program;

/// Upper bound on simulated run time, in executor intervals.
const RUN_LIMIT_INTERVALS: u32 = 64;

/// Plays Bunny Hop programs without a window.
#[derive(Debug, Parser)]
#[command(name = "bunny-hop", version, long_about = None)]
struct Cli {
    /// Level catalog TOML file used instead of the built-in levels.
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Log filter directive; defaults to `RUST_LOG` or `warn`.
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Lists the levels of the catalog.
    Levels,
    /// Runs a program on a level and prints the outcome.
    Play(PlayArgs),
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Zero-based index of the level to play.
    #[arg(long, default_value_t = 0)]
    level: u32,

    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Prints the run report as JSON.
    #[arg(long)]
    json: bool,

    /// Instructions: forward|f, left|l, right|r, loop, loop2|loop3|loop4, end.
    #[arg(required = true, num_args = 1..)]
    program: Vec<String>,
}

/// Entry point for the Bunny Hop command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    let catalog = load_catalog(cli.catalog.as_ref())?;
    match cli.command {
        None => {
            let world = World::new(catalog);
            println!("{}", query::welcome_banner(&world));
            Ok(())
        }
        Some(CliCommand::Levels) => {
            list_levels(&catalog);
            Ok(())
        }
        Some(CliCommand::Play(args)) => play(catalog, &args),
    }
}

fn init_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!(error))
        .context("failed to install log subscriber")
}

fn load_catalog(path: Option<&PathBuf>) -> Result<LevelCatalog> {
    let Some(path) = path else {
        return LevelCatalog::builtin().context("built-in level catalog is invalid");
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level catalog at {}", path.display()))?;
    let catalog = LevelCatalog::from_toml_str(&contents)
        .with_context(|| format!("failed to load level catalog at {}", path.display()))?;
    info!(levels = catalog.len(), path = %path.display(), "level catalog loaded");
    Ok(catalog)
}

fn list_levels(catalog: &LevelCatalog) {
    let unlock = catalog.settings().loop_unlock_level;
    for (index, level) in catalog.levels().iter().enumerate() {
        let loops = if u32::try_from(index).map_or(true, |index| index >= unlock) {
            ", loops"
        } else {
            ""
        };
        let obstacle = if level.obstacle().is_some() {
            format!(", obstacle with {} switch(es)", level.switches().len())
        } else {
            String::new()
        };
        println!(
            "{index}: {} cells facing {:?}, {} blocks{obstacle}{loops}",
            level.path().len(),
            level.facing(),
            level.block_budget(),
        );
    }
}

fn play(catalog: LevelCatalog, args: &PlayArgs) -> Result<()> {
    let level = LevelId::new(args.level);
    if catalog.level(level).is_none() {
        bail!(
            "level {} does not exist; the catalog has {} levels",
            args.level,
            catalog.len()
        );
    }
    if args.frame_ms == 0 {
        bail!("--frame-ms must be positive");
    }

    let program = parse_program(&args.program).context("failed to parse program")?;
    let limit = catalog.settings().tick_interval() * RUN_LIMIT_INTERVALS;

    let mut session = Session::at_level(catalog, level);
    session.load_program(&program);
    session.press_play();
    let _ = session.run_until_settled(Duration::from_millis(args.frame_ms), limit)?;

    let report = RunReport::from_session(&session);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode run report")?
        );
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for notice in &report.notices {
        println!("{notice}");
    }

    let summary = match (report.state, report.outcome) {
        (GameState::Editing, _) => "The program did not run.".to_owned(),
        (_, Some(Outcome::Complete)) => "Level complete!".to_owned(),
        (_, Some(Outcome::Failed { cause })) => format!("Run failed: {cause:?}."),
        (_, Some(Outcome::Uncomplete)) => "The bunny stopped before the goal.".to_owned(),
        (state, None) => format!("Run ended in state {state:?}."),
    };
    println!("{summary}");
    println!(
        "Level {}: {} action(s) dispatched, {} block(s) used, ended at ({}, {}) facing {:?}.",
        report.level.get(),
        report.dispatched.len(),
        report.slots_used,
        report.position.x(),
        report.position.z(),
        report.facing,
    );
}
