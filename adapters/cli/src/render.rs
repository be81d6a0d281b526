//! Plain-text rendering of the grid for terminal output.

use std::fmt::Write as _;

use puzzle_paths_core::{Cell, GRID_SIZE};
use puzzle_paths_world::{query, GameState};

const TOKEN: char = '@';

/// Draws the grid row by row followed by a progress line.
pub(crate) fn render(state: &GameState) -> String {
    let grid = query::grid(state);
    let switches = query::switches(state);
    let token = query::player_position(state);

    let capacity = usize::try_from(GRID_SIZE * (GRID_SIZE * 2 + 1)).unwrap_or(0) + 64;
    let mut out = String::with_capacity(capacity);
    for (position, cell) in grid.cells() {
        let glyph = if position == token {
            TOKEN
        } else {
            match cell {
                Cell::Empty => '.',
                Cell::Wall => '#',
                Cell::Start => 'S',
                Cell::Goal => 'G',
                Cell::Switch { id } if switches.is_active(id) => 'X',
                Cell::Switch { .. } => 'x',
                Cell::Door { switch } if switches.is_active(switch) => '_',
                Cell::Door { .. } => '|',
            }
        };
        out.push(glyph);
        out.push(if position.x() + 1 == GRID_SIZE { '\n' } else { ' ' });
    }

    let _ = write!(
        out,
        "goals {}/{}",
        query::collected_goals(state),
        query::total_goals(state)
    );
    if let Some(index) = query::current_move_index(state) {
        let _ = write!(out, "  step {}/{}", index + 1, query::moves(state).len());
    }
    out
}

#[cfg(test)]
mod tests {
    use puzzle_paths_core::Level;

    use super::*;

    #[test]
    fn draws_token_over_start_cell() {
        let rendered = render(&GameState::new(Level::new(1)));
        let rows: Vec<&str> = rendered.lines().collect();

        assert_eq!(rows.len(), 9);
        assert_eq!(rows[1], ". @ . . . . G .");
        assert_eq!(rows[3], ". . . # # . . .");
        assert_eq!(rows[8], "goals 0/1");
    }

    #[test]
    fn shows_closed_door_and_idle_switch() {
        let rendered = render(&GameState::new(Level::new(2)));
        let rows: Vec<&str> = rendered.lines().collect();

        assert_eq!(rows[3], ". . . x . . . .");
        assert_eq!(rows[4], ". . . . | . . .");
        assert_eq!(rows[5], ". . . . . # . .");
    }
}
