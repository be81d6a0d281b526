//! Pumps commands through the game state and the program runner.

use puzzle_paths_core::{Command, Event, Level};
use puzzle_paths_system_runner::{Config, ProgramRunner};
use puzzle_paths_world::{self as world, GameState};

/// Single play session owning the state and the runner driving it.
#[derive(Debug)]
pub(crate) struct Session {
    state: GameState,
    runner: ProgramRunner,
}

impl Session {
    pub(crate) fn new(level: Level, config: Config) -> Self {
        Self {
            state: GameState::new(level),
            runner: ProgramRunner::new(config),
        }
    }

    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Applies `command` and every follow-up command the runner emits,
    /// returning all events in the order they were broadcast.
    pub(crate) fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.state, command, &mut events);
            }
            self.runner.handle(&events, &mut pending);
            log.extend(events);
        }

        log
    }
}
