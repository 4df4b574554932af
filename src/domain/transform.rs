/// Cell space ↔ world space.
///
/// World space is whatever surface the presentation draws on; for the
/// terminal renderer one world unit is one terminal column/row. A cell
/// covers `cell_w × cell_h` world units and cell (0, 0) starts at `origin`.

use super::grid::Coord;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellTransform {
    pub cell_w: i32,
    pub cell_h: i32,
    pub origin: (i32, i32),
}

impl CellTransform {
    pub fn new(cell_w: i32, cell_h: i32) -> Self {
        CellTransform { cell_w: cell_w.max(1), cell_h: cell_h.max(1), origin: (0, 0) }
    }

    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }

    /// Top-left world position of a (possibly fractional) cell position.
    pub fn cell_to_world(&self, cx: f32, cy: f32) -> (f32, f32) {
        (
            self.origin.0 as f32 + cx * self.cell_w as f32,
            self.origin.1 as f32 + cy * self.cell_h as f32,
        )
    }

    /// The cell containing a world position. Positions left of or above the
    /// origin map to negative cells, which the grid reports as Invalid.
    pub fn world_to_cell(&self, wx: i32, wy: i32) -> Coord {
        Coord::new(
            (wx - self.origin.0).div_euclid(self.cell_w),
            (wy - self.origin.1).div_euclid(self.cell_h),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_to_world_scales_and_offsets() {
        let t = CellTransform::new(2, 1).with_origin(3, 4);
        assert_eq!(t.cell_to_world(0.0, 0.0), (3.0, 4.0));
        assert_eq!(t.cell_to_world(5.0, 2.0), (13.0, 6.0));
        assert_eq!(t.cell_to_world(1.5, 0.5), (6.0, 4.5));
    }

    #[test]
    fn world_to_cell_covers_whole_cell() {
        let t = CellTransform::new(2, 1).with_origin(3, 4);
        assert_eq!(t.world_to_cell(3, 4), Coord::new(0, 0));
        assert_eq!(t.world_to_cell(4, 4), Coord::new(0, 0));
        assert_eq!(t.world_to_cell(5, 4), Coord::new(1, 0));
        assert_eq!(t.world_to_cell(14, 9), Coord::new(5, 5));
    }

    #[test]
    fn world_left_of_origin_is_negative() {
        let t = CellTransform::new(2, 1).with_origin(3, 4);
        assert_eq!(t.world_to_cell(2, 4), Coord::new(-1, 0));
        assert_eq!(t.world_to_cell(3, 3), Coord::new(0, -1));
    }

    #[test]
    fn zero_cell_size_is_clamped() {
        let t = CellTransform::new(0, -3);
        assert_eq!(t.cell_w, 1);
        assert_eq!(t.cell_h, 1);
    }
}
