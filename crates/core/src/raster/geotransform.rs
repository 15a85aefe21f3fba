//! North-up grid georeferencing

use serde::{Deserialize, Serialize};

/// Placement of a north-up grid of square cells in planar coordinates.
///
/// Converts between cell indices (col, row) and planar coordinates (x, y):
/// ```text
/// x = origin_x + col * cell_size
/// y = origin_y - row * cell_size
/// ```
///
/// `(origin_x, origin_y)` is the top-left corner of cell (0, 0), so row 0 is
/// the northern-most row and pixel (0, 0) of a rendered image lines up with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell edge length (planar units, positive)
    pub cell_size: f64,
}

impl GridTransform {
    pub fn new(origin_x: f64, origin_y: f64, cell_size: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_size,
        }
    }

    /// Planar coordinates of the centre of cell (col, row)
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.cell_size,
            self.origin_y - (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Fractional (col, row) of a planar coordinate; use `.floor()` for indices
    pub fn to_cell(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.cell_size,
            (self.origin_y - y) / self.cell_size,
        )
    }

    /// Inclusive range of cells whose centres can fall inside
    /// `[min_x, max_x] × [min_y, max_y]`, clamped to a `cols × rows` grid.
    ///
    /// The range is padded by one cell on every side so that centres lying
    /// on the rectangle's edge survive rounding in the index arithmetic; the
    /// caller still tests each centre. Returns `None` when the padded range
    /// misses the grid.
    pub fn center_window(
        &self,
        (min_x, min_y, max_x, max_y): (f64, f64, f64, f64),
        cols: usize,
        rows: usize,
    ) -> Option<((usize, usize), (usize, usize))> {
        if cols == 0 || rows == 0 {
            return None;
        }

        // centre of col c is at c + 0.5 in fractional cell space
        let (c0, r0) = self.to_cell(min_x, max_y);
        let (c1, r1) = self.to_cell(max_x, min_y);

        let col_lo = ((c0 - 0.5).ceil() - 1.0).max(0.0);
        let col_hi = ((c1 - 0.5).floor() + 1.0).min(cols as f64 - 1.0);
        let row_lo = ((r0 - 0.5).ceil() - 1.0).max(0.0);
        let row_hi = ((r1 - 0.5).floor() + 1.0).min(rows as f64 - 1.0);

        if !(col_lo <= col_hi && row_lo <= row_hi) {
            return None;
        }

        Some((
            (col_lo as usize, col_hi as usize),
            (row_lo as usize, row_hi as usize),
        ))
    }

    /// Planar extent `(min_x, min_y, max_x, max_y)` of a `cols × rows` grid
    pub fn extent(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        (
            self.origin_x,
            self.origin_y - rows as f64 * self.cell_size,
            self.origin_x + cols as f64 * self.cell_size,
            self.origin_y,
        )
    }
}

impl Default for GridTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_roundtrip() {
        let gt = GridTransform::new(100.0, 200.0, 10.0);

        let (x, y) = gt.cell_center(5, 10);
        let (col, row) = gt.to_cell(x, y);

        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_extent() {
        let gt = GridTransform::new(0.0, 100.0, 1.0);
        let (min_x, min_y, max_x, max_y) = gt.extent(100, 50);

        assert_relative_eq!(min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(min_y, 50.0, epsilon = 1e-10);
        assert_relative_eq!(max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(max_y, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_center_window() {
        // 10x10 grid of unit cells, centres at 0.5, 1.5, ...
        let gt = GridTransform::new(0.0, 10.0, 1.0);

        let window = gt.center_window((1.0, 1.0, 3.0, 3.0), 10, 10).unwrap();
        // centres in [1, 3] are cols 1..=2, padded by one on each side
        assert_eq!(window.0, (0, 3));
        // rows: centre y = 10 - (r + 0.5) in [1, 3] → r = 7, 8, padded
        assert_eq!(window.1, (6, 9));

        // padding is clamped to the grid
        let window = gt.center_window((0.5, 9.5, 0.5, 9.5), 10, 10).unwrap();
        assert_eq!(window, ((0, 1), (0, 1)));

        // Outside the grid, even after padding
        assert!(gt.center_window((20.0, 20.0, 30.0, 30.0), 10, 10).is_none());
        assert!(gt.center_window((-30.0, 0.0, -20.0, 5.0), 10, 10).is_none());
    }

    #[test]
    fn test_center_window_keeps_edge_centres() {
        // centres computed from a non-round origin and cell size do not land
        // exactly on k + 0.5 in fractional cell space
        for (ox, oy, cs) in [(0.37, 1000.0, 0.1), (523_417.3, 291_002.9, 0.3), (-12.7, 5.1, 0.7)] {
            let gt = GridTransform::new(ox, oy, cs);
            for (c_lo, c_hi, r_lo, r_hi) in [(1, 4, 2, 9), (0, 11, 0, 11), (3, 3, 5, 5)] {
                let (min_x, max_y) = gt.cell_center(c_lo, r_lo);
                let (max_x, min_y) = gt.cell_center(c_hi, r_hi);
                let ((wc0, wc1), (wr0, wr1)) = gt.center_window((min_x, min_y, max_x, max_y), 12, 12).unwrap();
                assert!(wc0 <= c_lo && wc1 >= c_hi, "cols {:?} for origin ({}, {}) cs {}", (wc0, wc1), ox, oy, cs);
                assert!(wr0 <= r_lo && wr1 >= r_hi, "rows {:?} for origin ({}, {}) cs {}", (wr0, wr1), ox, oy, cs);
            }
        }
    }
}
