//! Fixed maze templates keyed by level tier.

use puzzle_paths_core::{Cell, Grid, Level, Position, SwitchId};

const SWITCH_NAME: &str = "switch1";

/// Builds the initial grid for the provided level.
///
/// Levels one and two have dedicated layouts; every other level reuses the
/// denser default template. No randomness is involved.
#[must_use]
pub fn generate(level: Level) -> Grid {
    match level.get() {
        1 => corridor(),
        2 => single_gate(),
        _ => split_gate(),
    }
}

/// Walls only: a straight run from the start to the goal.
fn corridor() -> Grid {
    let mut grid = Grid::empty();
    grid.set(Position::new(1, 1), Cell::Start);
    grid.set(Position::new(6, 1), Cell::Goal);
    for (x, y) in [(3, 3), (4, 3), (3, 4)] {
        grid.set(Position::new(x, y), Cell::Wall);
    }
    grid
}

/// Introduces one switch and the door it gates.
fn single_gate() -> Grid {
    let mut grid = Grid::empty();
    let switch = SwitchId::new(SWITCH_NAME);
    grid.set(Position::new(1, 1), Cell::Start);
    grid.set(Position::new(6, 6), Cell::Goal);
    grid.set(
        Position::new(3, 3),
        Cell::Switch {
            id: switch.clone(),
        },
    );
    grid.set(Position::new(4, 4), Cell::Door { switch });
    grid.set(Position::new(2, 2), Cell::Wall);
    grid.set(Position::new(5, 5), Cell::Wall);
    grid
}

/// Switch and door separated by a wall row with a single gap at (2, 3).
fn split_gate() -> Grid {
    let mut grid = Grid::empty();
    let switch = SwitchId::new(SWITCH_NAME);
    grid.set(Position::new(0, 0), Cell::Start);
    grid.set(Position::new(7, 7), Cell::Goal);
    grid.set(
        Position::new(2, 2),
        Cell::Switch {
            id: switch.clone(),
        },
    );
    grid.set(Position::new(5, 5), Cell::Door { switch });
    for x in 1..=5 {
        if x != 2 {
            grid.set(Position::new(x, 3), Cell::Wall);
        }
    }
    grid
}
