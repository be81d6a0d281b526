#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Puzzle Paths engine.
//!
//! This crate defines the data model and the message surface that connects
//! adapters, the authoritative game state, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable state, and respond exclusively with new command batches.

use std::{collections::BTreeMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Number of cells along each edge of the square puzzle grid.
pub const GRID_SIZE: u32 = 8;

/// Number of hints a player may request per level.
pub const HINT_ALLOWANCE: u8 = 3;

/// Commands that express all permissible game state mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the session with a freshly generated state for the level.
    LoadLevel {
        /// Level whose layout should be generated.
        level: Level,
    },
    /// Regenerates the current level, discarding all progress.
    ResetLevel,
    /// Loads the level following the current one.
    AdvanceLevel,
    /// Appends a move to the end of the authored program.
    AddMove {
        /// Instruction to append.
        kind: MoveKind,
    },
    /// Removes the move stored at the provided program index.
    RemoveMove {
        /// Zero-based index into the authored program.
        index: usize,
    },
    /// Requests that the authored program starts executing.
    StartRun,
    /// Marks the move at `index` as the one currently being played back.
    BeginStep {
        /// Zero-based index into the authored program.
        index: usize,
    },
    /// Applies the move at `index` to the game state.
    ExecuteStep {
        /// Zero-based index into the authored program.
        index: usize,
    },
    /// Concludes the active run after the final move was applied.
    FinishRun,
    /// Interrupts the active run, leaving state where it stopped.
    CancelRun,
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Consumes one unit of the hint allowance.
    ConsumeHint,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh state replaced the previous session.
    LevelLoaded {
        /// Level that is now active.
        level: Level,
        /// Initial token position.
        start: Position,
        /// Number of goal cells present in the grid.
        total_goals: u32,
    },
    /// Reports that a level change was refused.
    LevelChangeRejected {
        /// Specific reason the change failed.
        reason: RunError,
    },
    /// Confirms that a move was appended to the program.
    MoveAdded {
        /// Identifier allocated to the move.
        id: MoveId,
        /// Position of the move inside the program.
        index: usize,
    },
    /// Confirms that a move was removed from the program.
    MoveRemoved {
        /// Identifier of the removed move.
        id: MoveId,
        /// Position the move occupied before removal.
        index: usize,
    },
    /// Reports that an authoring command was refused.
    AuthoringRejected {
        /// Specific reason the command failed.
        reason: AuthoringError,
    },
    /// Announces that the authored program started executing.
    RunStarted {
        /// Number of moves frozen for the run.
        program_len: usize,
    },
    /// Reports that a run could not be started.
    RunRejected {
        /// Specific reason the run was refused.
        reason: RunError,
    },
    /// Notifies the presentation layer which move is being played back.
    StepStarted {
        /// Zero-based index into the authored program.
        index: usize,
    },
    /// Confirms that the token moved between two cells.
    TokenMoved {
        /// Program index of the move that caused the step.
        index: usize,
        /// Cell the token occupied before moving.
        from: Position,
        /// Cell the token occupies after moving.
        to: Position,
    },
    /// Reports that a move was silently rejected and left state unchanged.
    StepRejected {
        /// Program index of the rejected move.
        index: usize,
        /// Specific reason the move was rejected.
        reason: StepRejection,
    },
    /// Reports that entering a switch cell flipped its state.
    SwitchToggled {
        /// Switch that was flipped.
        switch: SwitchId,
        /// State of the switch after the flip.
        active: bool,
    },
    /// Reports that the token entered a goal cell.
    GoalCollected {
        /// Number of goal visits counted so far.
        collected: u32,
        /// Number of goal cells in the grid.
        total: u32,
    },
    /// Announces that the active run played back every move.
    RunFinished {
        /// Indicates whether the puzzle became complete during the run.
        solved: bool,
    },
    /// Fired once at the end of a run during which the puzzle was completed.
    PuzzleSolved,
    /// Announces that the active run was interrupted.
    RunCancelled {
        /// Index of the move that was pending when the run stopped.
        index: Option<usize>,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of real time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that one hint was consumed.
    HintConsumed {
        /// Hints left for the current level.
        remaining: u8,
    },
    /// Reports that no hints are left for the current level.
    HintRejected,
}

/// Reasons a directional step may be rejected by the move executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepRejection {
    /// The target lies outside the grid.
    OutOfBounds,
    /// The target cell is a wall.
    Wall,
    /// The target cell is a door whose switch is inactive.
    DoorClosed,
    /// The move variant is declared but not executed.
    Unsupported,
}

/// Reasons an authoring command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthoringError {
    /// The program is frozen because a run is in progress.
    ProgramRunning,
    /// No move exists at the requested index.
    IndexOutOfRange,
}

/// Reasons a run or level change may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunError {
    /// A run is already in progress.
    AlreadyRunning,
    /// The authored program contains no moves.
    EmptyProgram,
}

/// Cardinal movement directions available to the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction, in the order neighbours are scanned.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Lowercase name of the direction as shown to players.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.x < GRID_SIZE && self.y < GRID_SIZE
    }

    /// Offsets the position by one cell, returning `None` when the result
    /// falls outside the grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let next = match direction {
            Direction::Up => Self::new(self.x, self.y.checked_sub(1)?),
            Direction::Down => Self::new(self.x, self.y.checked_add(1)?),
            Direction::Left => Self::new(self.x.checked_sub(1)?, self.y),
            Direction::Right => Self::new(self.x.checked_add(1)?, self.y),
        };
        next.in_bounds().then_some(next)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identifier naming a switch and the doors it gates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwitchId(String);

impl SwitchId {
    /// Creates a switch identifier from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name carried by the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    /// Freely traversable floor.
    #[default]
    Empty,
    /// Impassable obstacle.
    Wall,
    /// Initial position of the token.
    Start,
    /// Cell the token must visit.
    Goal,
    /// Cell that flips its switch each time the token enters it.
    Switch {
        /// Identifier of the switch.
        id: SwitchId,
    },
    /// Cell that is passable only while its switch is active.
    Door {
        /// Switch that gates the door.
        switch: SwitchId,
    },
}

/// Activation state of every switch; absent switches are inactive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switches(BTreeMap<SwitchId, bool>);

impl Switches {
    /// Creates a mapping in which every switch is inactive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the switch is currently activated.
    #[must_use]
    pub fn is_active(&self, id: &SwitchId) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    /// Flips the switch and returns its new state.
    pub fn toggle(&mut self, id: &SwitchId) -> bool {
        let active = !self.is_active(id);
        let _ = self.0.insert(id.clone(), active);
        active
    }

    /// Iterator over every switch that has been touched, in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&SwitchId, bool)> {
        self.0.iter().map(|(id, active)| (id, *active))
    }
}

/// Dense, row-major 8×8 maze layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: [[Cell; GRID_SIZE as usize]; GRID_SIZE as usize],
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    /// Creates a grid filled with empty cells.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: std::array::from_fn(|_| std::array::from_fn(|_| Cell::Empty)),
        }
    }

    /// Returns the cell at the provided position, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        let (x, y) = Self::index(position)?;
        Some(&self.rows[y][x])
    }

    /// Overwrites the cell at the provided position. Positions outside the
    /// grid are ignored.
    pub fn set(&mut self, position: Position, cell: Cell) {
        if let Some((x, y)) = Self::index(position) {
            self.rows[y][x] = cell;
        }
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.rows.iter().zip(0u32..).flat_map(|(row, y)| {
            row.iter()
                .zip(0u32..)
                .map(move |(cell, x)| (Position::new(x, y), cell))
        })
    }

    /// First start cell found in a row-major scan, or the origin when the
    /// grid has none.
    #[must_use]
    pub fn start_position(&self) -> Position {
        self.cells()
            .find(|(_, cell)| matches!(cell, Cell::Start))
            .map_or(Position::new(0, 0), |(position, _)| position)
    }

    /// Number of goal cells in the grid.
    #[must_use]
    pub fn goal_count(&self) -> u32 {
        let count = self
            .cells()
            .filter(|(_, cell)| matches!(cell, Cell::Goal))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Reports whether any door is currently closed.
    #[must_use]
    pub fn has_closed_door(&self, switches: &Switches) -> bool {
        self.cells().any(|(_, cell)| match cell {
            Cell::Door { switch } => !switches.is_active(switch),
            _ => false,
        })
    }

    /// Identifiers of switches placed in the grid that are not active.
    #[must_use]
    pub fn unactivated_switches(&self, switches: &Switches) -> Vec<SwitchId> {
        self.cells()
            .filter_map(|(_, cell)| match cell {
                Cell::Switch { id } if !switches.is_active(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Checks the layout invariants: exactly one start, at least one goal,
    /// and every door gated by a switch present in the grid.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let starts = self
            .cells()
            .filter(|(_, cell)| matches!(cell, Cell::Start))
            .count();
        let doors_resolve = self.cells().all(|(_, cell)| match cell {
            Cell::Door { switch } => self
                .cells()
                .any(|(_, other)| matches!(other, Cell::Switch { id } if id == switch)),
            _ => true,
        });
        starts == 1 && self.goal_count() >= 1 && doors_resolve
    }

    fn index(position: Position) -> Option<(usize, usize)> {
        if !position.in_bounds() {
            return None;
        }
        let x = usize::try_from(position.x()).ok()?;
        let y = usize::try_from(position.y()).ok()?;
        Some((x, y))
    }
}

/// Unique identifier assigned to an authored move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoveId(u32);

impl MoveId {
    /// Creates a new move identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Instruction variants a program may contain.
///
/// Only [`MoveKind::Step`] is executed today. The remaining variants are
/// part of the program model so adapters can author them; the executor
/// treats them as no-ops.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Move the token one cell in the given direction.
    Step {
        /// Direction of travel.
        direction: Direction,
    },
    /// Flip a switch in place.
    Toggle,
    /// Repeat a nested sequence of moves.
    Loop {
        /// Number of repetitions.
        iterations: u32,
        /// Moves repeated on every iteration.
        body: Vec<MoveKind>,
    },
    /// Run the next move only when a condition holds.
    Conditional {
        /// Condition expression as authored by the player.
        condition: String,
    },
}

impl MoveKind {
    /// Convenience constructor for a directional step.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Self::Step { direction }
    }
}

/// Authored instruction paired with its identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Identifier used to address the move inside the program.
    pub id: MoveId,
    /// Semantic content of the move.
    pub kind: MoveKind,
}

/// Difficulty tier that selects a maze template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// Lowest level available to players.
    pub const FIRST: Level = Level(1);

    /// Creates a level wrapper, clamping to the first level.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self::FIRST
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Level preceding this one, never dropping below the first.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad category of advice a hint carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintCategory {
    /// Concrete next action.
    Suggestion,
    /// Something about the current program looks wrong.
    Warning,
    /// General reasoning prompt.
    Explanation,
}

/// Urgency of a hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintPriority {
    /// Background advice.
    Low,
    /// Worth reading.
    Medium,
    /// Directly actionable.
    High,
}

/// Contextual advice derived from the game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hint {
    /// Broad category of the advice.
    pub category: HintCategory,
    /// Message shown to the player.
    pub message: String,
    /// Urgency of the advice.
    pub priority: HintPriority,
}

#[cfg(test)]
mod tests {
    use super::{
        Cell, Direction, Grid, Level, MoveKind, Position, StepRejection, SwitchId, Switches,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn step_stays_inside_grid() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Right), Some(Position::new(1, 0)));
        assert_eq!(origin.step(Direction::Down), Some(Position::new(0, 1)));

        let corner = Position::new(7, 7);
        assert_eq!(corner.step(Direction::Down), None);
        assert_eq!(corner.step(Direction::Right), None);
    }

    #[test]
    fn absent_switch_is_inactive_and_toggles_back() {
        let mut switches = Switches::new();
        let id = SwitchId::new("switch1");
        assert!(!switches.is_active(&id));
        assert!(switches.toggle(&id));
        assert!(switches.is_active(&id));
        assert!(!switches.toggle(&id));
        assert!(!switches.is_active(&id));
    }

    #[test]
    fn start_position_uses_row_major_scan() {
        let mut grid = Grid::empty();
        grid.set(Position::new(5, 1), Cell::Start);
        grid.set(Position::new(2, 3), Cell::Start);
        assert_eq!(grid.start_position(), Position::new(5, 1));
    }

    #[test]
    fn start_position_defaults_to_origin() {
        assert_eq!(Grid::empty().start_position(), Position::new(0, 0));
    }

    #[test]
    fn well_formedness_requires_matching_switch() {
        let mut grid = Grid::empty();
        grid.set(Position::new(0, 0), Cell::Start);
        grid.set(Position::new(7, 7), Cell::Goal);
        assert!(grid.is_well_formed());

        let gate = SwitchId::new("gate");
        grid.set(
            Position::new(4, 4),
            Cell::Door {
                switch: gate.clone(),
            },
        );
        assert!(!grid.is_well_formed());
        assert!(grid.has_closed_door(&Switches::new()));

        grid.set(Position::new(2, 2), Cell::Switch { id: gate.clone() });
        assert!(grid.is_well_formed());
        assert_eq!(grid.unactivated_switches(&Switches::new()), vec![gate]);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut grid = Grid::empty();
        grid.set(Position::new(8, 0), Cell::Wall);
        assert!(grid.cells().all(|(_, cell)| *cell == Cell::Empty));
        assert_eq!(grid.cell(Position::new(0, 8)), None);
    }

    #[test]
    fn level_never_drops_below_first() {
        assert_eq!(Level::new(0), Level::FIRST);
        assert_eq!(Level::FIRST.previous(), Level::FIRST);
        assert_eq!(Level::new(3).previous(), Level::new(2));
        assert_eq!(Level::new(3).next(), Level::new(4));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn nested_loop_round_trips_through_bincode() {
        assert_round_trip(&MoveKind::Loop {
            iterations: 3,
            body: vec![
                MoveKind::step(Direction::Right),
                MoveKind::Conditional {
                    condition: "door_open".to_owned(),
                },
            ],
        });
    }

    #[test]
    fn step_rejection_round_trips_through_bincode() {
        assert_round_trip(&StepRejection::DoorClosed);
    }
}
