/// The level grid: a fixed-size W×H table of cell types.
///
/// ## Mutation
///
/// Only two entry points write to the grid after construction:
///   - `place_block()`    — River→Bridge or Open→Crate, prerequisite-gated
///   - `move_character()` — shifts the Character marker, old cell reverts to Open
///
/// Reads outside the grid return `CellType::Invalid` rather than failing.

use crate::error::{LevelError, LevelResult};

use super::tile::{CellType, PlaceKind};

/// Cell coordinate. Origin top-left, x right, y down.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Saturates at the `i32` range; anything that far out is off the grid anyway.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Coord { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy) }
    }

    /// Saturates at `i32::MAX` for coordinates at opposite ends of the range.
    pub fn manhattan(self, other: Coord) -> i32 {
        let d = self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y));
        i32::try_from(d).unwrap_or(i32::MAX)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<CellType>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build a grid from rows, enforcing the level contract:
    /// non-empty, rectangular, exactly one Goal and one Character.
    pub fn from_rows(rows: Vec<Vec<CellType>>) -> LevelResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if height == 0 || width == 0 {
            return Err(LevelError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(LevelError::Ragged { row: y, expected: width, found: row.len() });
            }
            cells.extend(row);
        }

        let goals = cells.iter().filter(|&&c| c == CellType::Goal).count();
        match goals {
            0 => return Err(LevelError::MissingGoal),
            1 => {}
            count => return Err(LevelError::MultipleGoals { count }),
        }
        let chars = cells.iter().filter(|&&c| c == CellType::Character).count();
        match chars {
            0 => return Err(LevelError::MissingCharacter),
            1 => {}
            count => return Err(LevelError::MultipleCharacters { count }),
        }

        Ok(Grid { cells, width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Flat index of (x, y), or None when outside the grid.
    #[inline]
    pub fn index(&self, c: Coord) -> Option<usize> {
        if self.in_bounds(c.x, c.y) {
            Some(c.y as usize * self.width + c.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn cell_type(&self, x: i32, y: i32) -> CellType {
        match self.index(Coord::new(x, y)) {
            Some(i) => self.cells[i],
            None => CellType::Invalid,
        }
    }

    #[inline]
    pub fn cell_at(&self, c: Coord) -> CellType {
        self.cell_type(c.x, c.y)
    }

    /// Place a player block. Returns false (grid untouched) when the
    /// target does not hold the kind's prerequisite type.
    pub fn place_block(&mut self, kind: PlaceKind, x: i32, y: i32) -> bool {
        let Some(i) = self.index(Coord::new(x, y)) else { return false };
        if self.cells[i] != kind.prerequisite() {
            return false;
        }
        self.cells[i] = kind.result();
        true
    }

    /// Move the Character marker. Adjacency is the caller's concern;
    /// writes outside the grid are dropped.
    pub fn move_character(&mut self, from: Coord, to: Coord) {
        if let Some(i) = self.index(from) {
            self.cells[i] = CellType::Open;
        }
        if let Some(i) = self.index(to) {
            self.cells[i] = CellType::Character;
        }
    }

    /// First cell of the given type in row-major order.
    pub fn find(&self, kind: CellType) -> Option<Coord> {
        self.cells.iter().position(|&c| c == kind).map(|i| {
            Coord::new((i % self.width) as i32, (i / self.width) as i32)
        })
    }

    pub fn goal(&self) -> Option<Coord> {
        self.find(CellType::Goal)
    }

    pub fn character(&self) -> Option<Coord> {
        self.find(CellType::Character)
    }

    /// Row slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellType]> {
        self.cells.chunks(self.width)
    }
}
