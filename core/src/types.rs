use ndarray::Array2;

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Zero-based `(x, y)` coordinates, also used for `(width, height)` sizes.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Reads the `(width, height)` of a grid back as board coordinates.
pub(crate) fn grid_size<T>(grid: &Array2<T>) -> Coord2 {
    let (x, y) = grid.dim();
    // grids are only ever built from a `Coord2`, so both axes fit
    (x as Coord, y as Coord)
}

/// Linear position of `coords` in row-major order over `size`, used when
/// sampling cells by index.
pub(crate) fn linear_index((x, y): Coord2, (width, _): Coord2) -> usize {
    usize::from(y) * usize::from(width) + usize::from(x)
}

pub(crate) fn from_linear_index(index: usize, (width, _): Coord2) -> Coord2 {
    let width = usize::from(width);
    ((index % width) as Coord, (index / width) as Coord)
}

/// Iterates the Moore neighbours of cells in a grid.
pub trait NeighborIterExt {
    fn iter_neighbors(&self, coords: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, grid_size(self))
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it stays on the board.
fn apply_delta((x, y): Coord2, (dx, dy): (i8, i8), (width, height): Coord2) -> Option<Coord2> {
    let next_x = x.checked_add_signed(dx).filter(|&nx| nx < width)?;
    let next_y = y.checked_add_signed(dy).filter(|&ny| ny < height)?;
    Some((next_x, next_y))
}

/// The up to 8 in-bounds cells horizontally, vertically or diagonally
/// adjacent to `center`.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: usize,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = DISPLACEMENTS.get(self.index) {
            self.index += 1;
            if let Some(coords) = apply_delta(self.center, delta, self.bounds) {
                return Some(coords);
            }
        }
        None
    }
}
