use serde::{Deserialize, Serialize};

/// Player-facing mark on a cell. Open and flagged exclude each other.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Open,
}

/// Everything the board knows about one position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub has_mine: bool,
    /// Mined Moore neighbours, only meaningful once mines are placed.
    pub adjacent_mines: u8,
    pub state: CellState,
}

impl Cell {
    pub const fn is_open(self) -> bool {
        matches!(self.state, CellState::Open)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self.state, CellState::Flagged)
    }
}

/// What a renderer should draw for a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibleCell {
    #[default]
    Hidden,
    Flagged,
    Open(u8),
    /// Only shown after a lost game revealed the mines.
    Mine,
}

impl VisibleCell {
    /// Single-character glyph used by text shells.
    pub const fn glyph(self) -> char {
        match self {
            Self::Hidden => '■',
            Self::Flagged => '⚑',
            Self::Open(0) => '·',
            Self::Open(count) => (b'0' + count) as char,
            Self::Mine => '¤',
        }
    }
}
