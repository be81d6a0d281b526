#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Puzzle Paths level in the terminal.

mod render;
mod script;
mod session;

use std::{thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use puzzle_paths_core::{Command, Event, Hint, Level, Position};
use puzzle_paths_system_hints::HintEngine;
use puzzle_paths_system_runner::Config;
use puzzle_paths_world::query;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Command-line arguments accepted by the Puzzle Paths binary.
#[derive(Debug, Parser)]
#[command(name = "puzzle-paths", about = "Program a robot through a switch-and-door maze")]
struct CliArgs {
    /// Level to load; levels above the built-in templates reuse the last one.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Program to run, e.g. "R R D" or "right,down,toggle".
    script: Option<String>,
    /// Delay between two moves during playback, in milliseconds.
    #[arg(long, default_value_t = 800)]
    step_delay_ms: u64,
    /// Real-time tick granularity, in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Spend one hint from the allowance and print it before running.
    #[arg(long)]
    hint: bool,
    /// Print the step-by-step walkthrough before running.
    #[arg(long)]
    explain: bool,
    /// Seconds spent on the level, used to suggest the next level.
    #[arg(long)]
    time_spent: Option<u64>,
    /// Attempts made on the level, used to suggest the next level.
    #[arg(long, default_value_t = 1)]
    attempts: u32,
    /// Print the final outcome as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Enable debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// Outcome of a session reported after playback.
#[derive(Debug, Serialize)]
struct Summary {
    level: Level,
    position: Position,
    collected_goals: u32,
    total_goals: u32,
    complete: bool,
    solved: bool,
    hint: Option<Hint>,
    next_level: Option<Level>,
}

/// Entry point for the Puzzle Paths command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose)?;

    let program = match args.script.as_deref() {
        Some(script) => script::parse(script).context("failed to parse move script")?,
        None => Vec::new(),
    };

    let config = Config::new(Duration::from_millis(args.step_delay_ms));
    let mut session = Session::new(Level::new(args.level), config);
    let engine = HintEngine::new();

    for kind in program {
        let _ = session.submit(Command::AddMove { kind });
    }

    let hint = if args.hint {
        request_hint(&mut session, &engine)
    } else {
        None
    };
    if !args.json {
        if let Some(hint) = &hint {
            println!("[{:?}/{:?}] {}", hint.category, hint.priority, hint.message);
        }
    }

    if args.explain && !args.json {
        for step in engine.explain(session.state()) {
            println!("{step}");
        }
    }

    let solved = play(&mut session, Duration::from_millis(args.tick_ms.max(1)), !args.json);

    let next_level = args.time_spent.map(|seconds| {
        engine.adapt_difficulty(
            session.state(),
            Duration::from_secs(seconds),
            args.attempts,
        )
    });

    let state = session.state();
    let summary = Summary {
        level: query::level(state),
        position: query::player_position(state),
        collected_goals: query::collected_goals(state),
        total_goals: query::total_goals(state),
        complete: query::is_complete(state),
        solved,
        hint,
        next_level,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        println!(
            "goals {}/{} at {}",
            summary.collected_goals, summary.total_goals, summary.position
        );
        if let Some(level) = summary.next_level {
            println!("suggested next level: {level}");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}

fn request_hint(session: &mut Session, engine: &HintEngine) -> Option<Hint> {
    let events = session.submit(Command::ConsumeHint);
    if events.contains(&Event::HintRejected) {
        info!("hint allowance exhausted");
        return None;
    }
    Some(engine.hint(session.state()))
}

/// Runs the authored program in real time, returning whether it solved the
/// puzzle.
fn play(session: &mut Session, tick: Duration, echo: bool) -> bool {
    if query::moves(session.state()).is_empty() {
        return false;
    }

    let mut solved = false;
    let events = session.submit(Command::StartRun);
    if echo {
        println!("{}\n", render::render(session.state()));
    }
    if !events.iter().any(|event| matches!(event, Event::RunStarted { .. })) {
        return false;
    }

    while session.is_running() {
        thread::sleep(tick);
        let events = session.submit(Command::Tick { dt: tick });
        for event in &events {
            match event {
                Event::StepStarted { .. } if echo => {
                    println!("{}\n", render::render(session.state()));
                }
                Event::PuzzleSolved => solved = true,
                _ => {}
            }
        }
    }

    if echo {
        println!("{}", render::render(session.state()));
        if solved {
            println!("Puzzle solved!");
        }
    }
    solved
}
