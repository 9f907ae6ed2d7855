use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates {0:?} are outside the grid")]
    OutOfBounds(Coord2),
    #[error("No tile has been inserted at {0:?}")]
    EmptyCell(Coord2),
    #[error("Too many mines")]
    TooManyMines,
    #[error("Grid width and height must be at least 1")]
    InvalidSize,
}

pub type Result<T> = core::result::Result<T, GameError>;
