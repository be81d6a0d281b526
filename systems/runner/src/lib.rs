#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Program runner that paces playback of the authored program.
//!
//! The runner never touches the game state directly. It watches for
//! [`Event::RunStarted`] and [`Event::TimeAdvanced`] and answers with
//! `BeginStep`, `ExecuteStep` and `FinishRun` commands, one move per
//! configured step delay.

use std::time::Duration;

use puzzle_paths_core::{Command, Event};
use tracing::trace;

/// Delay between two consecutive moves during playback.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(800);

/// Configuration parameters required to construct the runner.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step_delay: Duration,
}

impl Config {
    /// Creates a new configuration using the provided playback cadence.
    #[must_use]
    pub const fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    /// Delay between two consecutive moves.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        self.step_delay
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DELAY)
    }
}

/// Playback state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    /// No run has started since the level was loaded.
    Idle,
    /// The move at `index` is highlighted and waiting for its delay to pass.
    Running {
        /// Zero-based index of the pending move.
        index: usize,
    },
    /// The last run played back every move. Accepts new runs like `Idle`.
    Completed,
}

/// Pure system that turns elapsed time into step commands.
#[derive(Debug)]
pub struct ProgramRunner {
    step_delay: Duration,
    accumulator: Duration,
    program_len: usize,
    phase: RunPhase,
}

impl Default for ProgramRunner {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ProgramRunner {
    /// Creates a new runner using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_delay: config.step_delay,
            accumulator: Duration::ZERO,
            program_len: 0,
            phase: RunPhase::Idle,
        }
    }

    /// Current playback phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Reports whether a run is in progress.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, RunPhase::Running { .. })
    }

    /// Consumes world events to emit playback commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunStarted { program_len } => self.begin(*program_len, out),
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                Event::RunCancelled { .. } | Event::LevelLoaded { .. } => self.reset(),
                _ => {}
            }
        }
    }

    fn begin(&mut self, program_len: usize, out: &mut Vec<Command>) {
        if self.is_running() {
            return;
        }
        self.reset();
        if program_len == 0 {
            return;
        }

        self.program_len = program_len;
        self.phase = RunPhase::Running { index: 0 };
        out.push(Command::BeginStep { index: 0 });
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let RunPhase::Running { mut index } = self.phase else {
            return;
        };

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.step_delay {
            self.accumulator -= self.step_delay;
            trace!(index, "step due");
            out.push(Command::ExecuteStep { index });
            index += 1;

            if index >= self.program_len {
                out.push(Command::FinishRun);
                self.phase = RunPhase::Completed;
                self.accumulator = Duration::ZERO;
                return;
            }
            out.push(Command::BeginStep { index });
        }
        self.phase = RunPhase::Running { index };
    }

    fn reset(&mut self) {
        self.phase = RunPhase::Idle;
        self.accumulator = Duration::ZERO;
        self.program_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_delay_emits_nothing() {
        let mut runner = ProgramRunner::new(Config::new(Duration::from_millis(800)));
        let mut commands = Vec::new();
        runner.handle(&[Event::RunStarted { program_len: 2 }], &mut commands);
        commands.clear();

        runner.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(500),
            }],
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(runner.phase(), RunPhase::Running { index: 0 });
    }

    #[test]
    fn zero_delay_drains_program_in_one_tick() {
        let mut runner = ProgramRunner::new(Config::new(Duration::ZERO));
        let mut commands = Vec::new();
        runner.handle(
            &[
                Event::RunStarted { program_len: 2 },
                Event::TimeAdvanced { dt: Duration::ZERO },
            ],
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![
                Command::BeginStep { index: 0 },
                Command::ExecuteStep { index: 0 },
                Command::BeginStep { index: 1 },
                Command::ExecuteStep { index: 1 },
                Command::FinishRun,
            ]
        );
        assert_eq!(runner.phase(), RunPhase::Completed);
    }

    #[test]
    fn time_outside_a_run_is_ignored() {
        let mut runner = ProgramRunner::default();
        let mut commands = Vec::new();
        runner.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(10),
            }],
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(runner.phase(), RunPhase::Idle);
    }
}
