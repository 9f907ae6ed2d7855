use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use serde::Serialize;

use crate::*;

/// Rectangular collection of tiles, at most one per coordinate.
///
/// Cells stay empty until a tile is inserted. All whole-grid queries visit
/// cells in row-major order (`y` outer, `x` inner).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    size: Coord2,
    cells: Array2<Option<Tile>>,
}

impl Grid {
    pub fn new(size: Coord2) -> Self {
        Self {
            size,
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn width(&self) -> Coord {
        self.size.0
    }

    pub fn height(&self) -> Coord {
        self.size.1
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn within_bounds(&self, (x, y): Coord2) -> bool {
        x < self.size.0 && y < self.size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.within_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }

    /// Every coordinate of the grid, populated or not.
    pub fn coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (width, height) = self.size;
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    pub fn for_each_cell<F>(&self, mut visit: F)
    where
        F: FnMut(Coord2, Option<&Tile>),
    {
        for coords in self.coords() {
            visit(coords, self.cells[coords.to_nd_index()].as_ref());
        }
    }

    /// Populated tiles only.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.coords()
            .filter_map(|coords| self.cells[coords.to_nd_index()].as_ref())
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> + '_ {
        self.cells.iter_mut().flatten()
    }

    /// Places `tile` at its own coordinates, returning any tile it replaced.
    pub fn insert_tile(&mut self, tile: Tile) -> Result<Option<Tile>> {
        let coords = self.validate_coords(tile.coords())?;
        Ok(self.cells[coords.to_nd_index()].replace(tile))
    }

    pub fn tile(&self, coords: Coord2) -> Result<&Tile> {
        let coords = self.validate_coords(coords)?;
        self.cells[coords.to_nd_index()]
            .as_ref()
            .ok_or(GameError::EmptyCell(coords))
    }

    pub fn tile_mut(&mut self, coords: Coord2) -> Result<&mut Tile> {
        let coords = self.validate_coords(coords)?;
        self.cells[coords.to_nd_index()]
            .as_mut()
            .ok_or(GameError::EmptyCell(coords))
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|&pos| self.tile(pos).is_ok_and(Tile::is_mine))
            .count() as u8
    }

    /// Coordinates of every tile that does not hold a mine.
    pub fn available_cells(&self) -> Vec<Coord2> {
        self.tiles()
            .filter(|tile| !tile.is_mine())
            .map(Tile::coords)
            .collect()
    }

    pub fn cells_available(&self) -> bool {
        self.tiles().any(|tile| !tile.is_mine())
    }

    /// Uniformly picks one of [`Grid::available_cells`], `None` when every tile is mined.
    pub fn random_available_cell<R>(&self, rng: &mut R) -> Option<Coord2>
    where
        R: Rng + ?Sized,
    {
        self.available_cells().choose(rng).copied()
    }

    pub fn tiles_with_mines(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles().filter(|tile| tile.is_mine())
    }

    pub fn tiles_with_flags_and_no_mines(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles()
            .filter(|tile| tile.is_flagged() && !tile.is_mine())
    }

    pub fn tiles_without_mines_or_numbers(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles()
            .filter(|tile| !tile.is_mine() && !tile.is_numbered())
    }

    pub fn tiles_with_numbers(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles().filter(|tile| tile.is_numbered())
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.tiles().filter(|tile| !tile.is_mine()).count() as CellCount
    }

    pub fn cleared_count(&self) -> CellCount {
        self.tiles().filter(|tile| tile.is_cleared()).count() as CellCount
    }
}
