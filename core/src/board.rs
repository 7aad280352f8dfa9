use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

/// The grid of one game: mines are placed lazily on the first open, so the
/// first opened cell is never a mine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    cells: Array2<Cell>,
    seed: u64,
    start_tile: StartTile,
    mines_placed: bool,
    opened_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
    mines_revealed: bool,
}

impl Board {
    pub fn new(config: GameConfig) -> Self {
        Self::with_start_tile(config, StartTile::default())
    }

    /// Random seed, chosen placement rule.
    pub fn with_start_tile(config: GameConfig, start_tile: StartTile) -> Self {
        Self::with_seed(config, rand::random(), start_tile)
    }

    pub fn with_seed(config: GameConfig, seed: u64, start_tile: StartTile) -> Self {
        Self {
            config,
            cells: Array2::default(config.size.to_nd_index()),
            seed,
            start_tile,
            mines_placed: false,
            opened_count: 0,
            flagged_count: 0,
            triggered_mine: None,
            mines_revealed: false,
        }
    }

    /// Validates the dimensions and mine count before building an empty board.
    pub fn create(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        Ok(Self::new(GameConfig::new((width, height), mines)?))
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn start_tile(&self) -> StartTile {
        self.start_tile
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn opened_count(&self) -> CellCount {
        self.opened_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    /// The mine that ended the game, if any.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn is_won(&self) -> bool {
        self.opened_count == self.config.safe_cells()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.config.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    /// Sum of every adjacency count; fixed once mines are placed.
    pub fn total_adjacency(&self) -> u32 {
        self.cells
            .iter()
            .map(|cell| u32::from(cell.adjacent_mines))
            .sum()
    }

    /// Places mines with the board's own seeded generator.
    pub fn place_mines_avoiding(&mut self, safe: Coord2) -> Result<()> {
        let generator = RandomMinefieldGenerator::new(self.seed, self.start_tile);
        self.place_mines_with(generator, safe)
    }

    /// Places mines from `generator`, which must leave `safe` clear and
    /// produce exactly the configured number of mines.
    pub fn place_mines_with<G: MinefieldGenerator>(
        &mut self,
        generator: G,
        safe: Coord2,
    ) -> Result<()> {
        if self.mines_placed {
            return Err(GameError::MinesAlreadyPlaced);
        }
        let safe = self.validate_coords(safe)?;

        let layout = generator.generate(self.config, safe);
        if layout.size() != self.config.size
            || layout.mine_count() != self.config.mines
            || layout.contains_mine(safe)
        {
            log::warn!(
                "Rejected mine layout of {:?} with {} mines for {:?}",
                layout.size(),
                layout.mine_count(),
                self.config
            );
            return Err(GameError::InvalidLayout);
        }

        for ((x, y), cell) in self.cells.indexed_iter_mut() {
            let coords = (x as Coord, y as Coord);
            cell.has_mine = layout.contains_mine(coords);
            cell.adjacent_mines = layout.adjacent_mine_count(coords);
        }
        self.mines_placed = true;
        Ok(())
    }

    /// Opens a hidden cell, placing mines first if this is the first open.
    /// A zero cell flood-fills its connected zero region and that region's
    /// numbered border.
    pub fn open(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.triggered_mine.is_some() {
            return Err(GameError::AlreadyEnded);
        }

        match self.cells[coords.to_nd_index()].state {
            CellState::Open => return Err(GameError::AlreadyOpen),
            CellState::Flagged => return Err(GameError::CellFlagged),
            CellState::Hidden => {}
        }

        if !self.mines_placed {
            self.place_mines_avoiding(coords)?;
        }

        if self.cells[coords.to_nd_index()].has_mine {
            log::debug!("Mine hit at {:?}", coords);
            self.triggered_mine = Some(coords);
            return Ok(OpenOutcome::Exploded);
        }

        let opened = self.flood_open(coords);
        log::debug!("Opened {} cells from {:?}", opened, coords);
        Ok(OpenOutcome::Opened(opened))
    }

    /// Worklist flood-fill, bounded by the grid instead of the call stack.
    fn flood_open(&mut self, start: Coord2) -> CellCount {
        let mut opened = 0;
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            let cell = &mut self.cells[coords.to_nd_index()];
            // neighbours of a zero cell are never mined; flags and open cells stay put
            if cell.state != CellState::Hidden || cell.has_mine {
                continue;
            }
            cell.state = CellState::Open;
            opened += 1;

            let adjacent_mines = cell.adjacent_mines;
            log::trace!("Open cell at {:?}, mine count: {}", coords, adjacent_mines);

            if adjacent_mines == 0 {
                to_visit.extend(
                    self.cells
                        .iter_neighbors(coords)
                        .filter(|&pos| self.cells[pos.to_nd_index()].state == CellState::Hidden),
                );
            }
        }

        self.opened_count += opened;
        opened
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];

        match cell.state {
            CellState::Open => Err(GameError::AlreadyOpen),
            CellState::Hidden => {
                cell.state = CellState::Flagged;
                self.flagged_count += 1;
                Ok(FlagOutcome::Flagged)
            }
            CellState::Flagged => {
                cell.state = CellState::Hidden;
                self.flagged_count -= 1;
                Ok(FlagOutcome::Unflagged)
            }
        }
    }

    /// Makes every unflagged mine visible, used when the game is lost.
    pub fn reveal_mines(&mut self) {
        self.mines_revealed = true;
    }

    pub fn visible_state(&self, coords: Coord2) -> Result<VisibleCell> {
        self.cell(coords).map(|cell| self.project(cell))
    }

    /// Snapshot of what a renderer shows, indexed `[x, y]`.
    pub fn visible_grid(&self) -> Array2<VisibleCell> {
        self.cells.map(|&cell| self.project(cell))
    }

    fn project(&self, cell: Cell) -> VisibleCell {
        match cell.state {
            CellState::Flagged => VisibleCell::Flagged,
            CellState::Open => VisibleCell::Open(cell.adjacent_mines),
            CellState::Hidden if self.mines_revealed && cell.has_mine => VisibleCell::Mine,
            CellState::Hidden => VisibleCell::Hidden,
        }
    }
}
