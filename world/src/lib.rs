#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Puzzle Paths.

pub mod executor;
pub mod maze;

use puzzle_paths_core::{
    AuthoringError, Command, Event, Grid, Level, Move, MoveId, Position, RunError, Switches,
    HINT_ALLOWANCE,
};
use tracing::{debug, info};

use crate::executor::{MoveDelta, Resolution};

/// Canonical snapshot of one play session.
#[derive(Clone, Debug)]
pub struct GameState {
    grid: Grid,
    player_position: Position,
    moves: Vec<Move>,
    switches: Switches,
    collected_goals: u32,
    total_goals: u32,
    is_complete: bool,
    is_executing: bool,
    current_move_index: Option<usize>,
    level: Level,
    hints_remaining: u8,
    solved_during_run: bool,
    next_move_id: u32,
}

impl GameState {
    /// Creates a fresh session for the provided level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let grid = maze::generate(level);
        let player_position = grid.start_position();
        let total_goals = grid.goal_count();
        Self {
            grid,
            player_position,
            moves: Vec::new(),
            switches: Switches::new(),
            collected_goals: 0,
            total_goals,
            is_complete: false,
            is_executing: false,
            current_move_index: None,
            level,
            hints_remaining: HINT_ALLOWANCE,
            solved_during_run: false,
            next_move_id: 0,
        }
    }

    /// Merges a delta produced by the move executor into the state.
    pub fn fold(&mut self, delta: MoveDelta) {
        if let Some(position) = delta.player_position {
            self.player_position = position;
        }
        if let Some(switches) = delta.switches {
            self.switches = switches;
        }
        if let Some(collected) = delta.collected_goals {
            self.collected_goals = collected;
        }
        if let Some(complete) = delta.is_complete {
            self.is_complete = complete;
        }
    }

    fn replace_with(&mut self, level: Level, out_events: &mut Vec<Event>) {
        if self.is_executing {
            out_events.push(Event::LevelChangeRejected {
                reason: RunError::AlreadyRunning,
            });
            return;
        }

        *self = Self::new(level);
        info!(level = level.get(), "level loaded");
        out_events.push(Event::LevelLoaded {
            level,
            start: self.player_position,
            total_goals: self.total_goals,
        });
    }

    fn allocate_move_id(&mut self) -> MoveId {
        let id = MoveId::new(self.next_move_id);
        self.next_move_id = self.next_move_id.wrapping_add(1);
        id
    }

    fn execute_step(&mut self, index: usize, out_events: &mut Vec<Event>) {
        if !self.is_executing || self.current_move_index != Some(index) {
            debug!(index, "ignoring step outside the active cursor");
            return;
        }
        let Some(step) = self.moves.get(index) else {
            return;
        };

        let from = self.player_position;
        match executor::resolve_move(self, &step.kind) {
            Resolution::Rejected(reason) => {
                debug!(index, ?reason, "step rejected");
                out_events.push(Event::StepRejected { index, reason });
            }
            Resolution::Applied(delta) => {
                let toggled_before = self.switches.clone();
                let goals_before = self.collected_goals;
                self.fold(delta);

                out_events.push(Event::TokenMoved {
                    index,
                    from,
                    to: self.player_position,
                });
                for (switch, active) in self.switches.iter() {
                    if toggled_before.is_active(switch) != active {
                        out_events.push(Event::SwitchToggled {
                            switch: switch.clone(),
                            active,
                        });
                    }
                }
                if self.collected_goals != goals_before {
                    out_events.push(Event::GoalCollected {
                        collected: self.collected_goals,
                        total: self.total_goals,
                    });
                }
            }
        }

        if self.is_complete {
            self.solved_during_run = true;
        }
    }
}

/// Applies the provided command to the game state, mutating it deterministically.
pub fn apply(state: &mut GameState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => state.replace_with(level, out_events),
        Command::ResetLevel => {
            let level = state.level;
            state.replace_with(level, out_events);
        }
        Command::AdvanceLevel => {
            let level = state.level.next();
            state.replace_with(level, out_events);
        }
        Command::AddMove { kind } => {
            if state.is_executing {
                out_events.push(Event::AuthoringRejected {
                    reason: AuthoringError::ProgramRunning,
                });
                return;
            }
            let id = state.allocate_move_id();
            state.moves.push(Move { id, kind });
            out_events.push(Event::MoveAdded {
                id,
                index: state.moves.len() - 1,
            });
        }
        Command::RemoveMove { index } => {
            if state.is_executing {
                out_events.push(Event::AuthoringRejected {
                    reason: AuthoringError::ProgramRunning,
                });
                return;
            }
            if index >= state.moves.len() {
                out_events.push(Event::AuthoringRejected {
                    reason: AuthoringError::IndexOutOfRange,
                });
                return;
            }
            let removed = state.moves.remove(index);
            out_events.push(Event::MoveRemoved {
                id: removed.id,
                index,
            });
        }
        Command::StartRun => {
            let rejection = if state.is_executing {
                Some(RunError::AlreadyRunning)
            } else if state.moves.is_empty() {
                Some(RunError::EmptyProgram)
            } else {
                None
            };
            if let Some(reason) = rejection {
                debug!(?reason, "run rejected");
                out_events.push(Event::RunRejected { reason });
                return;
            }

            state.is_executing = true;
            state.solved_during_run = false;
            state.current_move_index = None;
            out_events.push(Event::RunStarted {
                program_len: state.moves.len(),
            });
        }
        Command::BeginStep { index } => {
            if state.is_executing && index < state.moves.len() {
                state.current_move_index = Some(index);
                out_events.push(Event::StepStarted { index });
            }
        }
        Command::ExecuteStep { index } => state.execute_step(index, out_events),
        Command::FinishRun => {
            if !state.is_executing {
                return;
            }
            state.is_executing = false;
            state.current_move_index = None;
            let solved = state.solved_during_run;
            out_events.push(Event::RunFinished { solved });
            if solved {
                info!(
                    level = state.level.get(),
                    collected = state.collected_goals,
                    "puzzle solved"
                );
                out_events.push(Event::PuzzleSolved);
            }
        }
        Command::CancelRun => {
            if !state.is_executing {
                return;
            }
            let index = state.current_move_index.take();
            state.is_executing = false;
            out_events.push(Event::RunCancelled { index });
        }
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::ConsumeHint => {
            if state.hints_remaining == 0 {
                out_events.push(Event::HintRejected);
            } else {
                state.hints_remaining -= 1;
                out_events.push(Event::HintConsumed {
                    remaining: state.hints_remaining,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use super::GameState;
    use puzzle_paths_core::{Grid, Level, Move, Position, Switches};

    /// Maze layout of the session.
    #[must_use]
    pub fn grid(state: &GameState) -> &Grid {
        &state.grid
    }

    /// Current token position.
    #[must_use]
    pub fn player_position(state: &GameState) -> Position {
        state.player_position
    }

    /// Program authored so far, in execution order.
    #[must_use]
    pub fn moves(state: &GameState) -> &[Move] {
        &state.moves
    }

    /// Activation mapping of every switch.
    #[must_use]
    pub fn switches(state: &GameState) -> &Switches {
        &state.switches
    }

    /// Number of goal visits counted so far.
    #[must_use]
    pub fn collected_goals(state: &GameState) -> u32 {
        state.collected_goals
    }

    /// Number of goal cells in the grid.
    #[must_use]
    pub fn total_goals(state: &GameState) -> u32 {
        state.total_goals
    }

    /// Reports whether every goal has been collected.
    #[must_use]
    pub fn is_complete(state: &GameState) -> bool {
        state.is_complete
    }

    /// Reports whether a run currently owns the state.
    #[must_use]
    pub fn is_executing(state: &GameState) -> bool {
        state.is_executing
    }

    /// Index of the move being played back, `None` while idle.
    #[must_use]
    pub fn current_move_index(state: &GameState) -> Option<usize> {
        state.current_move_index
    }

    /// Level the session was generated for.
    #[must_use]
    pub fn level(state: &GameState) -> Level {
        state.level
    }

    /// Hints left for the current level.
    #[must_use]
    pub fn hints_remaining(state: &GameState) -> u8 {
        state.hints_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_paths_core::{Direction, MoveKind, SwitchId};

    fn author(state: &mut GameState, directions: &[Direction]) -> Vec<Event> {
        let mut events = Vec::new();
        for direction in directions {
            apply(
                state,
                Command::AddMove {
                    kind: MoveKind::step(*direction),
                },
                &mut events,
            );
        }
        events
    }

    fn run_all(state: &mut GameState) -> Vec<Event> {
        let mut events = Vec::new();
        apply(state, Command::StartRun, &mut events);
        for index in 0..state.moves.len() {
            apply(state, Command::BeginStep { index }, &mut events);
            apply(state, Command::ExecuteStep { index }, &mut events);
        }
        apply(state, Command::FinishRun, &mut events);
        events
    }

    #[test]
    fn new_state_starts_idle_at_template_start() {
        let state = GameState::new(Level::new(1));
        assert_eq!(query::player_position(&state), Position::new(1, 1));
        assert_eq!(query::total_goals(&state), 1);
        assert_eq!(query::hints_remaining(&state), HINT_ALLOWANCE);
        assert_eq!(query::current_move_index(&state), None);
        assert!(!query::is_executing(&state));
    }

    #[test]
    fn authored_moves_receive_unique_ids() {
        let mut state = GameState::new(Level::new(1));
        let events = author(&mut state, &[Direction::Right, Direction::Right]);
        assert_eq!(
            events,
            vec![
                Event::MoveAdded {
                    id: MoveId::new(0),
                    index: 0
                },
                Event::MoveAdded {
                    id: MoveId::new(1),
                    index: 1
                },
            ]
        );

        let mut removal = Vec::new();
        apply(&mut state, Command::RemoveMove { index: 0 }, &mut removal);
        apply(&mut state, Command::RemoveMove { index: 4 }, &mut removal);
        assert_eq!(
            removal,
            vec![
                Event::MoveRemoved {
                    id: MoveId::new(0),
                    index: 0
                },
                Event::AuthoringRejected {
                    reason: AuthoringError::IndexOutOfRange
                },
            ]
        );
        assert_eq!(query::moves(&state)[0].id, MoveId::new(1));
    }

    #[test]
    fn program_is_frozen_while_running() {
        let mut state = GameState::new(Level::new(1));
        let _ = author(&mut state, &[Direction::Right]);
        let mut events = Vec::new();
        apply(&mut state, Command::StartRun, &mut events);
        apply(
            &mut state,
            Command::AddMove {
                kind: MoveKind::step(Direction::Down),
            },
            &mut events,
        );
        apply(&mut state, Command::RemoveMove { index: 0 }, &mut events);
        apply(&mut state, Command::StartRun, &mut events);
        apply(&mut state, Command::ResetLevel, &mut events);

        assert_eq!(
            events,
            vec![
                Event::RunStarted { program_len: 1 },
                Event::AuthoringRejected {
                    reason: AuthoringError::ProgramRunning
                },
                Event::AuthoringRejected {
                    reason: AuthoringError::ProgramRunning
                },
                Event::RunRejected {
                    reason: RunError::AlreadyRunning
                },
                Event::LevelChangeRejected {
                    reason: RunError::AlreadyRunning
                },
            ]
        );
        assert_eq!(query::moves(&state).len(), 1);
    }

    #[test]
    fn empty_program_cannot_run() {
        let mut state = GameState::new(Level::new(1));
        let mut events = Vec::new();
        apply(&mut state, Command::StartRun, &mut events);
        assert_eq!(
            events,
            vec![Event::RunRejected {
                reason: RunError::EmptyProgram
            }]
        );
        assert!(!query::is_executing(&state));
    }

    #[test]
    fn solving_run_signals_puzzle_solved_once() {
        let mut state = GameState::new(Level::new(1));
        let _ = author(&mut state, &[Direction::Right; 6]);
        let events = run_all(&mut state);

        let solved = events
            .iter()
            .filter(|event| matches!(event, Event::PuzzleSolved))
            .count();
        assert_eq!(solved, 1);
        assert!(events.contains(&Event::RunFinished { solved: true }));
        assert!(events.contains(&Event::GoalCollected {
            collected: 1,
            total: 1,
        }));
        assert!(events.contains(&Event::TokenMoved {
            index: 5,
            from: Position::new(6, 1),
            to: Position::new(7, 1),
        }));
        assert!(query::is_complete(&state));
        assert_eq!(query::current_move_index(&state), None);
        assert!(!query::is_executing(&state));
    }

    #[test]
    fn unsolved_run_finishes_quietly() {
        let mut state = GameState::new(Level::new(1));
        let _ = author(&mut state, &[Direction::Up, Direction::Up, Direction::Left]);
        let events = run_all(&mut state);

        assert!(events.contains(&Event::RunFinished { solved: false }));
        assert!(!events.contains(&Event::PuzzleSolved));
        assert!(events.contains(&Event::StepRejected {
            index: 1,
            reason: puzzle_paths_core::StepRejection::OutOfBounds,
        }));
        assert_eq!(query::player_position(&state), Position::new(0, 0));
    }

    #[test]
    fn switch_then_door_scenario() {
        let mut state = GameState::new(Level::new(2));
        let _ = author(
            &mut state,
            &[
                Direction::Right,
                Direction::Right,
                Direction::Down,
                Direction::Down,
                Direction::Right,
                Direction::Down,
            ],
        );
        let events = run_all(&mut state);

        assert!(events.contains(&Event::SwitchToggled {
            switch: SwitchId::new("switch1"),
            active: true,
        }));
        assert!(events.contains(&Event::TokenMoved {
            index: 5,
            from: Position::new(4, 3),
            to: Position::new(4, 4),
        }));
        assert_eq!(query::player_position(&state), Position::new(4, 4));
    }

    #[test]
    fn cancel_leaves_state_where_interrupted() {
        let mut state = GameState::new(Level::new(1));
        let _ = author(&mut state, &[Direction::Right; 5]);
        let mut events = Vec::new();
        apply(&mut state, Command::StartRun, &mut events);
        for index in 0..2 {
            apply(&mut state, Command::BeginStep { index }, &mut events);
            apply(&mut state, Command::ExecuteStep { index }, &mut events);
        }
        apply(&mut state, Command::BeginStep { index: 2 }, &mut events);
        events.clear();
        apply(&mut state, Command::CancelRun, &mut events);

        assert_eq!(events, vec![Event::RunCancelled { index: Some(2) }]);
        assert_eq!(query::player_position(&state), Position::new(3, 1));
        assert!(!query::is_executing(&state));

        events.clear();
        apply(&mut state, Command::ExecuteStep { index: 2 }, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn hint_allowance_never_goes_negative() {
        let mut state = GameState::new(Level::new(1));
        let mut events = Vec::new();
        for _ in 0..4 {
            apply(&mut state, Command::ConsumeHint, &mut events);
        }
        assert_eq!(
            events,
            vec![
                Event::HintConsumed { remaining: 2 },
                Event::HintConsumed { remaining: 1 },
                Event::HintConsumed { remaining: 0 },
                Event::HintRejected,
            ]
        );
    }

    #[test]
    fn advance_replaces_state_wholesale() {
        let mut state = GameState::new(Level::new(1));
        let _ = author(&mut state, &[Direction::Right; 5]);
        let _ = run_all(&mut state);
        let mut events = Vec::new();
        apply(&mut state, Command::ConsumeHint, &mut events);
        events.clear();

        apply(&mut state, Command::AdvanceLevel, &mut events);

        assert_eq!(
            events,
            vec![Event::LevelLoaded {
                level: Level::new(2),
                start: Position::new(1, 1),
                total_goals: 1,
            }]
        );
        assert!(query::moves(&state).is_empty());
        assert!(!query::is_complete(&state));
        assert_eq!(query::collected_goals(&state), 0);
        assert_eq!(query::hints_remaining(&state), HINT_ALLOWANCE);
    }
}
