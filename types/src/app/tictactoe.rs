//! Tic-tac-toe payload.
//!
//! Wire format (10 bytes, fixed):
//! [next_actor:u8] [cell_0:u8] ... [cell_8:u8]
//!
//! Cells are indexed `y * 3 + x`:
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```
//! and hold `0` (empty), `1` (participant 0) or `2` (participant 1).

use crate::channel::{ParticipantIndex, NUM_PARTS};
use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use std::fmt;
use thiserror::Error as ThisError;

/// Side length of the board.
pub const BOARD_SIDE: usize = 3;

/// Number of cells on the board.
pub const GRID_SIZE: usize = BOARD_SIDE * BOARD_SIDE;

/// Largest valid cell code.
pub const MAX_CELL_VALUE: u8 = 2;

/// Every winning line, in the order they are checked.
///
/// The order is part of the on-chain contract: when a grid holds more than one
/// complete line, the first one listed here names the winner.
pub const WINNING_TRIPLES: [[usize; 3]; 8] = [
    // rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // diagonals
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    /// Mark of participant 0.
    X = 1,
    /// Mark of participant 1.
    O = 2,
}

impl Cell {
    /// Mark placed by `participant`.
    pub fn mark_of(participant: ParticipantIndex) -> Option<Self> {
        match participant {
            0 => Some(Self::X),
            1 => Some(Self::O),
            _ => None,
        }
    }

    /// Participant owning this mark.
    pub fn owner(self) -> Option<ParticipantIndex> {
        match self {
            Self::Empty => None,
            Self::X => Some(0),
            Self::O => Some(1),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

impl TryFrom<u8> for Cell {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Empty),
            1 => Ok(Self::X),
            2 => Ok(Self::O),
            _ => Err(Error::Invalid("Cell", "mark value out of range")),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Empty => ' ',
            Self::X => 'x',
            Self::O => 'o',
        };
        write!(f, "{symbol}")
    }
}

/// Next participant after `actor`, wrapping around the two seats.
pub fn next_actor(actor: ParticipantIndex) -> ParticipantIndex {
    ((usize::from(actor) + 1) % NUM_PARTS) as ParticipantIndex
}

/// Why a mark could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum MoveError {
    #[error("cell ({x}, {y}) is off the board")]
    OutOfBounds { x: usize, y: usize },
    #[error("cell ({x}, {y}) is already marked")]
    Occupied { x: usize, y: usize },
    #[error("participant {0} has no mark")]
    UnknownActor(ParticipantIndex),
}

/// Outcome of inspecting a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub is_final: bool,
    pub winner: Option<ParticipantIndex>,
}

/// Undecoded payload: the actor byte and raw cell codes, length-checked only.
///
/// Validators read the proposed state in this form so that an out-of-range cell
/// code is reported as a bad mark rather than as a malformed payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawTicTacToeData {
    pub next_actor: u8,
    pub grid: [u8; GRID_SIZE],
}

impl RawTicTacToeData {
    /// Index of the first cell whose code exceeds [`MAX_CELL_VALUE`].
    pub fn invalid_cell(&self) -> Option<usize> {
        self.grid.iter().position(|value| *value > MAX_CELL_VALUE)
    }
}

impl Read for RawTicTacToeData {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let next_actor = u8::read(reader)?;
        if reader.remaining() < GRID_SIZE {
            return Err(Error::EndOfBuffer);
        }
        let mut grid = [0u8; GRID_SIZE];
        reader.copy_to_slice(&mut grid);
        Ok(Self { next_actor, grid })
    }
}

impl FixedSize for RawTicTacToeData {
    const SIZE: usize = 1 + GRID_SIZE;
}

impl TryFrom<RawTicTacToeData> for TicTacToeData {
    type Error = Error;

    fn try_from(raw: RawTicTacToeData) -> Result<Self, Self::Error> {
        let mut grid = [Cell::Empty; GRID_SIZE];
        for (cell, value) in grid.iter_mut().zip(raw.grid) {
            *cell = Cell::try_from(value)?;
        }
        Ok(Self {
            next_actor: raw.next_actor,
            grid,
        })
    }
}

/// Tic-tac-toe application payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TicTacToeData {
    pub next_actor: ParticipantIndex,
    pub grid: [Cell; GRID_SIZE],
}

impl TicTacToeData {
    /// Empty board with `first_actor` to move.
    pub fn new(first_actor: ParticipantIndex) -> Self {
        Self {
            next_actor: first_actor,
            grid: [Cell::Empty; GRID_SIZE],
        }
    }

    /// Cell index for column `x`, row `y`, if on the board.
    pub fn index(x: usize, y: usize) -> Option<usize> {
        if x >= BOARD_SIDE || y >= BOARD_SIDE {
            return None;
        }
        Some(y * BOARD_SIDE + x)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.grid[idx])
    }

    pub fn is_empty_board(&self) -> bool {
        self.grid.iter().all(|cell| cell.is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.grid.iter().all(|cell| !cell.is_empty())
    }

    /// Decide whether the board is terminal and who, if anyone, won.
    pub fn check_final(&self) -> Outcome {
        for triple in WINNING_TRIPLES.iter() {
            if let Some(winner) = self.same_player(triple) {
                return Outcome {
                    is_final: true,
                    winner: Some(winner),
                };
            }
        }
        Outcome {
            is_final: self.is_full(),
            winner: None,
        }
    }

    /// Place `actor`'s mark at column `x`, row `y` and pass the turn.
    ///
    /// # Panics
    ///
    /// Panics if `actor` is not [`Self::next_actor`]: callers must only move on
    /// their own turn.
    pub fn apply_move(
        &mut self,
        x: usize,
        y: usize,
        actor: ParticipantIndex,
    ) -> Result<(), MoveError> {
        assert_eq!(
            actor, self.next_actor,
            "participant {actor} moved out of turn"
        );
        let mark = Cell::mark_of(actor).ok_or(MoveError::UnknownActor(actor))?;
        let idx = Self::index(x, y).ok_or(MoveError::OutOfBounds { x, y })?;
        if !self.grid[idx].is_empty() {
            return Err(MoveError::Occupied { x, y });
        }
        self.grid[idx] = mark;
        self.next_actor = next_actor(actor);
        Ok(())
    }

    fn same_player(&self, indices: &[usize; 3]) -> Option<ParticipantIndex> {
        let first = self.grid[indices[0]];
        if indices.iter().all(|idx| self.grid[*idx] == first) {
            first.owner()
        } else {
            None
        }
    }
}

impl Write for TicTacToeData {
    fn write(&self, writer: &mut impl BufMut) {
        self.next_actor.write(writer);
        for cell in self.grid.iter() {
            (*cell as u8).write(writer);
        }
    }
}

impl Read for TicTacToeData {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        RawTicTacToeData::read(reader)?.try_into()
    }
}

impl FixedSize for TicTacToeData {
    const SIZE: usize = RawTicTacToeData::SIZE;
}

impl fmt::Display for TicTacToeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid.chunks(BOARD_SIDE) {
            writeln!(f, "{}|{}|{}", row[0], row[1], row[2])?;
        }
        writeln!(f, "Next actor: {}", self.next_actor)
    }
}
