use thiserror::Error;

use crate::{CellCount, Coord};

/// Board dimension or mine count outside what a playable board allows.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Width must be between 1 and {max}, got {width}")]
    WidthOutOfRange { width: Coord, max: Coord },
    #[error("Height must be between {min} and {max}, got {height}")]
    HeightOutOfRange { height: Coord, min: Coord, max: Coord },
    #[error("At least one mine is required")]
    NoMines,
    #[error("Too many mines: {mines}, at most {max} fit while keeping a safe cell")]
    TooManyMines { mines: CellCount, max: CellCount },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Cell is already open")]
    AlreadyOpen,
    #[error("Cell is flagged")]
    CellFlagged,
    #[error("Mines were already placed on this board")]
    MinesAlreadyPlaced,
    #[error("Mine layout does not fit the board")]
    InvalidLayout,
    #[error("Game is paused")]
    Paused,
    #[error("Game is not running")]
    NotRunning,
    #[error("Game is not paused")]
    NotPaused,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

impl GameError {
    /// Errors caused by acting on a cell or session that cannot take the
    /// action right now. Shells ignore these instead of reporting them.
    pub const fn is_invalid_operation(self) -> bool {
        !matches!(self, Self::InvalidConfiguration(_))
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
