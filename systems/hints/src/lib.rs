#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule-based hint engine that reads the game state and produces advice.
//!
//! The engine is stateless. Spending the per-level hint allowance is the
//! caller's job, through `Command::ConsumeHint`.

use std::time::Duration;

use puzzle_paths_core::{Cell, Direction, Hint, HintCategory, HintPriority, Level};
use puzzle_paths_world::{query, GameState};

/// Programs longer than this trigger the "path too long" warning.
pub const LONG_PROGRAM_THRESHOLD: usize = 20;

const STRUGGLING_ATTEMPTS: u32 = 5;
const STRUGGLING_TIME: Duration = Duration::from_secs(300);
const CRUISING_ATTEMPTS: u32 = 2;
const CRUISING_TIME: Duration = Duration::from_secs(60);

const WALKTHROUGH: [&str; 4] = [
    "1. Analyze the maze layout and identify your goal",
    "2. Look for switches that control doors in your path",
    "3. Plan the shortest route, considering obstacles",
    "4. Execute your moves step by step",
];
const SWITCH_STEP: &str = "2.5. Activate necessary switches before approaching doors";

/// Produces hints and walkthroughs from a read-only view of the game state.
#[derive(Clone, Copy, Debug, Default)]
pub struct HintEngine;

impl HintEngine {
    /// Creates a new hint engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the first matching hint of the rule cascade.
    #[must_use]
    pub fn hint(&self, state: &GameState) -> Hint {
        let grid = query::grid(state);
        let switches = query::switches(state);
        let moves = query::moves(state);

        if moves.is_empty() {
            return Hint {
                category: HintCategory::Suggestion,
                message: "Start by planning your path to the goal. Look for obstacles and \
                          switches that might block your way."
                    .to_owned(),
                priority: HintPriority::Medium,
            };
        }

        if let Some(direction) = adjacent_goal(state) {
            return Hint {
                category: HintCategory::Suggestion,
                message: format!("You're close to a goal! Try moving {direction}."),
                priority: HintPriority::High,
            };
        }

        if !grid.unactivated_switches(switches).is_empty() && grid.has_closed_door(switches) {
            return Hint {
                category: HintCategory::Suggestion,
                message: "Some doors are blocking your path. Look for switches to activate them."
                    .to_owned(),
                priority: HintPriority::High,
            };
        }

        if moves.len() > LONG_PROGRAM_THRESHOLD {
            return Hint {
                category: HintCategory::Warning,
                message: "Your solution is getting quite long. Try to find a more efficient path."
                    .to_owned(),
                priority: HintPriority::Medium,
            };
        }

        Hint {
            category: HintCategory::Explanation,
            message: "Think step by step: Where do you need to go? What obstacles are in your way?"
                .to_owned(),
            priority: HintPriority::Low,
        }
    }

    /// Generic walkthrough, with a switch reminder while any door is closed.
    #[must_use]
    pub fn explain(&self, state: &GameState) -> Vec<String> {
        let mut steps: Vec<String> = WALKTHROUGH.iter().map(|step| (*step).to_owned()).collect();
        if query::grid(state).has_closed_door(query::switches(state)) {
            steps.insert(2, SWITCH_STEP.to_owned());
        }
        steps
    }

    /// Picks the level to play next from how long the player took and how
    /// often they retried the current one.
    #[must_use]
    pub fn adapt_difficulty(&self, state: &GameState, time_spent: Duration, attempts: u32) -> Level {
        let level = query::level(state);
        if attempts > STRUGGLING_ATTEMPTS && time_spent > STRUGGLING_TIME {
            return level.previous();
        }
        if attempts <= CRUISING_ATTEMPTS && time_spent < CRUISING_TIME {
            return level.next();
        }
        level
    }
}

fn adjacent_goal(state: &GameState) -> Option<Direction> {
    let grid = query::grid(state);
    let position = query::player_position(state);
    Direction::ALL.into_iter().find(|direction| {
        position
            .step(*direction)
            .and_then(|neighbour| grid.cell(neighbour))
            .is_some_and(|cell| matches!(cell, Cell::Goal))
    })
}
