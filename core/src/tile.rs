use serde::Serialize;

use crate::*;

/// Mutable state of a single grid cell.
///
/// A tile never holds a mine and a number at the same time: planting a mine
/// drops any number the tile carried.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    x: Coord,
    y: Coord,
    mine: bool,
    flagged: bool,
    cleared: bool,
    covered: bool,
    numbered: bool,
    number_value: u8,
}

impl Tile {
    pub const fn new((x, y): Coord2) -> Self {
        Self {
            x,
            y,
            mine: false,
            flagged: false,
            cleared: false,
            covered: true,
            numbered: false,
            number_value: 0,
        }
    }

    pub const fn x(&self) -> Coord {
        self.x
    }

    pub const fn y(&self) -> Coord {
        self.y
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }

    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Whether the tile has been permanently revealed.
    pub const fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub const fn is_covered(&self) -> bool {
        self.covered
    }

    pub const fn is_numbered(&self) -> bool {
        self.numbered
    }

    /// Raw adjacency count, only meaningful when [`Tile::is_numbered`] is true.
    pub const fn number_value(&self) -> u8 {
        self.number_value
    }

    pub const fn number(&self) -> Option<u8> {
        if self.numbered {
            Some(self.number_value)
        } else {
            None
        }
    }

    pub fn plant_mine(&mut self) {
        self.mine = true;
        self.clear_number();
    }

    pub fn unplant_mine(&mut self) {
        self.mine = false;
    }

    pub(crate) fn set_number(&mut self, value: u8) {
        debug_assert!(!self.mine, "mined tile at {:?} cannot be numbered", self.coords());
        self.numbered = true;
        self.number_value = value;
    }

    pub(crate) fn clear_number(&mut self) {
        self.numbered = false;
        self.number_value = 0;
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) {
        self.flagged = flagged;
    }

    pub(crate) fn reveal(&mut self) {
        self.cleared = true;
        self.covered = false;
    }
}
