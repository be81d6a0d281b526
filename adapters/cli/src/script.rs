//! Parser for the textual move scripts accepted on the command line.

use puzzle_paths_core::{Direction, MoveKind};
use thiserror::Error;

/// Errors that can occur while parsing a move script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// A token did not name any known move.
    #[error("unknown move `{token}` at position {position}")]
    UnknownMove {
        /// Offending token as written.
        token: String,
        /// One-based position of the token within the script.
        position: usize,
    },
}

/// Parses a script such as `"R R D"` or `"right,down,toggle"` into moves.
///
/// Tokens are separated by whitespace or commas and matched
/// case-insensitively.
pub(crate) fn parse(script: &str) -> Result<Vec<MoveKind>, ScriptError> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            parse_token(token).ok_or_else(|| ScriptError::UnknownMove {
                token: token.to_owned(),
                position: index + 1,
            })
        })
        .collect()
}

fn parse_token(token: &str) -> Option<MoveKind> {
    let kind = match token.to_ascii_lowercase().as_str() {
        "u" | "up" => MoveKind::step(Direction::Up),
        "d" | "down" => MoveKind::step(Direction::Down),
        "l" | "left" => MoveKind::step(Direction::Left),
        "r" | "right" => MoveKind::step(Direction::Right),
        "t" | "toggle" => MoveKind::Toggle,
        _ => return None,
    };
    Some(kind)
}
