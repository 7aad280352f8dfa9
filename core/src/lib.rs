//! Single-player minesweeper engine: board generation with a safe first
//! click, flood-fill opening, a timed session state machine and a persisted
//! best-time table.

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use difficulty::*;
pub use error::*;
pub use generator::*;
pub use scores::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod difficulty;
mod error;
mod generator;
mod scores;
mod session;
mod tile;
mod types;

/// Widest board a custom level may ask for.
pub const MAX_WIDTH: Coord = 34;
/// Height range a custom level may ask for.
pub const MIN_HEIGHT: Coord = 5;
pub const MAX_HEIGHT: Coord = 19;

/// Board dimensions and mine count, validated so at least one safe cell exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Rejects, rather than clamps, anything outside the playable bounds.
    pub fn new((width, height): Coord2, mines: CellCount) -> Result<Self> {
        if !(1..=MAX_WIDTH).contains(&width) {
            return Err(ConfigError::WidthOutOfRange {
                width,
                max: MAX_WIDTH,
            }
            .into());
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
            return Err(ConfigError::HeightOutOfRange {
                height,
                min: MIN_HEIGHT,
                max: MAX_HEIGHT,
            }
            .into());
        }
        if mines == 0 {
            return Err(ConfigError::NoMines.into());
        }
        let max = mult(width, height) - 1;
        if mines > max {
            return Err(ConfigError::TooManyMines { mines, max }.into());
        }
        Ok(Self::new_unchecked((width, height), mines))
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        x < self.size.0 && y < self.size.1
    }
}

/// Where the mines are on a board, fixed once generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        Self {
            mine_mask,
            mine_count: CellCount::try_from(mine_count).unwrap_or(CellCount::MAX),
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.mine_mask)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // at most 8 neighbours
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count() as u8
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((x, y), _)| (x as Coord, y as Coord))
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Result of opening a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenOutcome {
    /// Number of cells newly opened, including flood-filled ones.
    Opened(CellCount),
    /// The cell held a mine.
    Exploded,
}

impl OpenOutcome {
    pub const fn exploded(self) -> bool {
        matches!(self, Self::Exploded)
    }
}

/// Result of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagOutcome {
    Flagged,
    Unflagged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_accepts_bounds() {
        assert!(GameConfig::new((1, 5), 1).is_ok());
        assert!(GameConfig::new((34, 19), 34 * 19 - 1).is_ok());
    }

    #[test]
    fn config_rejects_full_board() {
        assert_eq!(
            GameConfig::new((8, 8), 64),
            Err(GameError::InvalidConfiguration(ConfigError::TooManyMines {
                mines: 64,
                max: 63
            }))
        );
    }

    #[test]
    fn config_rejects_out_of_range_dimensions() {
        for (size, mines) in [((0, 8), 1), ((35, 8), 1), ((8, 4), 1), ((8, 20), 1), ((8, 8), 0)] {
            let err = GameConfig::new(size, mines).unwrap_err();
            assert!(
                matches!(err, GameError::InvalidConfiguration(_)),
                "{size:?}/{mines} gave {err:?}"
            );
        }
    }

    #[test]
    fn layout_counts_adjacent_mines() {
        let layout = MineLayout::from_mine_coords((3, 5), &[(0, 0), (2, 0)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.adjacent_mine_count((1, 0)), 2);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((0, 1)), 1);
        assert_eq!(layout.adjacent_mine_count((1, 4)), 0);
        assert_eq!(layout.iter_mines().collect::<Vec<_>>(), vec![(0, 0), (2, 0)]);
    }

    #[test]
    fn layout_rejects_out_of_bounds_mine() {
        assert_eq!(
            MineLayout::from_mine_coords((3, 5), &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
    }
}
