use super::*;

/// Uniformly random placement from a seed, keeping the start tile clear
/// according to its [`StartTile`] policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start_tile: StartTile,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start_tile: StartTile) -> Self {
        Self { seed, start_tile }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig, safe: Coord2) -> MineLayout {
        use StartTile::*;
        use rand::prelude::*;
        use rand::seq::index;

        let size = config.size;
        let total_cells = usize::from(config.total_cells());
        let mines = usize::from(config.mines);
        let neighbor_count = NeighborIter::new(safe, size).count();

        let start_tile = match self.start_tile {
            AlwaysZero if mines + 1 + neighbor_count > total_cells => {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
                SimpleSafe
            }
            other => other,
        };

        let mut excluded: Array2<bool> = Array2::default(size.to_nd_index());
        excluded[safe.to_nd_index()] = true;
        if start_tile == AlwaysZero {
            for coords in NeighborIter::new(safe, size) {
                excluded[coords.to_nd_index()] = true;
            }
        }

        let candidates: Vec<Coord2> = (0..total_cells)
            .map(|i| from_linear_index(i, size))
            .filter(|&coords| !excluded[coords.to_nd_index()])
            .collect();

        let amount = mines.min(candidates.len());
        if amount < mines {
            log::warn!(
                "Minefield too small, requested {} mines but only {} cells are free",
                mines,
                candidates.len()
            );
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for i in index::sample(&mut rng, candidates.len(), amount) {
            mine_mask[candidates[i].to_nd_index()] = true;
        }

        log::debug!(
            "Placed {} mines on {:?} avoiding {:?} ({:?})",
            amount,
            size,
            safe,
            start_tile
        );
        MineLayout::from_mine_mask(mine_mask)
    }
}
