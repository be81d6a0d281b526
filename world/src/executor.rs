//! Pure move executor that validates a single instruction against the game
//! state and describes its effect as a delta.
//!
//! The executor never mutates state and never fails: a rejected move yields
//! the empty [`MoveDelta`], and callers fold accepted deltas with
//! [`GameState::fold`].

use puzzle_paths_core::{Cell, Direction, MoveKind, Position, StepRejection, Switches};

use crate::GameState;

/// Partial state update produced by applying one move.
///
/// Fields left as `None` are unchanged by the move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveDelta {
    /// New token position.
    pub player_position: Option<Position>,
    /// Switch mapping after the move.
    pub switches: Option<Switches>,
    /// Goal visit counter after the move.
    pub collected_goals: Option<u32>,
    /// Completion flag recomputed after the move.
    pub is_complete: Option<bool>,
}

impl MoveDelta {
    /// Reports whether the delta leaves every field unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.player_position.is_none()
            && self.switches.is_none()
            && self.collected_goals.is_none()
            && self.is_complete.is_none()
    }
}

/// Outcome of resolving a move against the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The move was accepted and produced the enclosed delta.
    Applied(MoveDelta),
    /// The move was rejected and leaves state untouched.
    Rejected(StepRejection),
}

impl Resolution {
    /// Collapses the resolution into a delta, empty when rejected.
    #[must_use]
    pub fn into_delta(self) -> MoveDelta {
        match self {
            Self::Applied(delta) => delta,
            Self::Rejected(_) => MoveDelta::default(),
        }
    }
}

/// Applies `kind` to `state` and returns the resulting delta.
#[must_use]
pub fn apply_move(state: &GameState, kind: &MoveKind) -> MoveDelta {
    resolve_move(state, kind).into_delta()
}

/// Validates and applies `kind`, keeping the rejection reason.
#[must_use]
pub fn resolve_move(state: &GameState, kind: &MoveKind) -> Resolution {
    match kind {
        MoveKind::Step { direction } => match check_step(state, *direction) {
            Ok(target) => Resolution::Applied(enter(state, target)),
            Err(reason) => Resolution::Rejected(reason),
        },
        // Declared but not executed yet.
        MoveKind::Toggle | MoveKind::Loop { .. } | MoveKind::Conditional { .. } => {
            Resolution::Rejected(StepRejection::Unsupported)
        }
    }
}

/// Computes the target of a directional step, rejecting moves that leave
/// the grid, hit a wall, or hit a door whose switch is inactive.
pub fn check_step(state: &GameState, direction: Direction) -> Result<Position, StepRejection> {
    let target = state
        .player_position
        .step(direction)
        .ok_or(StepRejection::OutOfBounds)?;

    match state.grid.cell(target) {
        None => Err(StepRejection::OutOfBounds),
        Some(Cell::Wall) => Err(StepRejection::Wall),
        Some(Cell::Door { switch }) if !state.switches.is_active(switch) => {
            Err(StepRejection::DoorClosed)
        }
        Some(_) => Ok(target),
    }
}

fn enter(state: &GameState, target: Position) -> MoveDelta {
    let mut collected = state.collected_goals;
    let mut switches = state.switches.clone();

    match state.grid.cell(target) {
        // Goals stay in the grid, so re-entering one counts again.
        Some(Cell::Goal) => collected = collected.saturating_add(1),
        Some(Cell::Switch { id }) => {
            let _ = switches.toggle(id);
        }
        _ => {}
    }

    MoveDelta {
        player_position: Some(target),
        switches: Some(switches),
        collected_goals: Some(collected),
        is_complete: Some(collected >= state.total_goals),
    }
}

#[cfg(test)]
mod tests {
    use puzzle_paths_core::{Level, SwitchId};

    use super::*;

    fn run(state: &mut GameState, directions: &[Direction]) {
        for direction in directions {
            let delta = apply_move(state, &MoveKind::step(*direction));
            state.fold(delta);
        }
    }

    #[test]
    fn walking_right_five_times_solves_first_level() {
        let mut state = GameState::new(Level::new(1));
        run(&mut state, &[Direction::Right; 5]);

        assert_eq!(state.player_position, Position::new(6, 1));
        assert_eq!(state.collected_goals, 1);
        assert!(state.is_complete);
    }

    #[test]
    fn walls_and_edges_yield_empty_delta() {
        let mut state = GameState::new(Level::new(1));
        state.player_position = Position::new(3, 2);
        assert_eq!(
            resolve_move(&state, &MoveKind::step(Direction::Down)),
            Resolution::Rejected(StepRejection::Wall)
        );
        assert!(apply_move(&state, &MoveKind::step(Direction::Down)).is_empty());

        state.player_position = Position::new(0, 0);
        assert_eq!(
            check_step(&state, Direction::Up),
            Err(StepRejection::OutOfBounds)
        );
        assert!(apply_move(&state, &MoveKind::step(Direction::Left)).is_empty());
    }

    #[test]
    fn closed_door_blocks_until_switch_activated() {
        let mut state = GameState::new(Level::new(2));
        state.player_position = Position::new(4, 3);
        assert_eq!(
            check_step(&state, Direction::Down),
            Err(StepRejection::DoorClosed)
        );

        let _ = state.switches.toggle(&SwitchId::new("switch1"));
        assert_eq!(check_step(&state, Direction::Down), Ok(Position::new(4, 4)));
    }

    #[test]
    fn unsupported_variants_are_no_ops() {
        let state = GameState::new(Level::new(1));
        for kind in [
            MoveKind::Toggle,
            MoveKind::Loop {
                iterations: 2,
                body: vec![MoveKind::step(Direction::Right)],
            },
            MoveKind::Conditional {
                condition: "goal_ahead".to_owned(),
            },
        ] {
            assert_eq!(
                resolve_move(&state, &kind),
                Resolution::Rejected(StepRejection::Unsupported)
            );
        }
    }

    #[test]
    fn entering_switch_twice_restores_it() {
        let mut state = GameState::new(Level::new(2));
        let switch = SwitchId::new("switch1");
        state.player_position = Position::new(3, 2);

        run(&mut state, &[Direction::Down]);
        assert!(state.switches.is_active(&switch));

        run(&mut state, &[Direction::Up, Direction::Down]);
        assert!(!state.switches.is_active(&switch));
    }

    #[test]
    fn goal_re_entry_keeps_counting() {
        let mut state = GameState::new(Level::new(1));
        state.player_position = Position::new(5, 1);

        run(
            &mut state,
            &[Direction::Right, Direction::Left, Direction::Right],
        );
        assert_eq!(state.collected_goals, 2);
        assert!(state.is_complete);
    }
}
