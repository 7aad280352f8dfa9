use crate::*;
pub use random::*;

mod random;

/// Produces the mine layout for a board once the first opened cell is known.
pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig, safe: Coord2) -> MineLayout;
}

/// How much room the first opened cell gets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartTile {
    /// The first cell never holds a mine.
    #[default]
    SimpleSafe,
    /// Neither the first cell nor its neighbours hold a mine, so the first
    /// click always flood-fills.
    AlwaysZero,
}

/// A prebuilt layout, used as-is whatever the first cell is.
impl MinefieldGenerator for MineLayout {
    fn generate(self, _config: GameConfig, _safe: Coord2) -> MineLayout {
        self
    }
}
