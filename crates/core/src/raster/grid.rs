//! Main raster grid type

use crate::error::{Error, Result};
use crate::raster::GridTransform;
use ndarray::Array2;

/// A georeferenced 2D grid of estimated values.
///
/// Values are stored row-major as `(row, col)`; row 0 is the top (north) row.
/// `NaN` is the "no value" sentinel for cells where estimation was undefined.
///
/// # Example
///
/// ```ignore
/// use nitrogis_core::raster::{GridTransform, RasterGrid};
///
/// let mut grid = RasterGrid::new(GridTransform::new(0.0, 100.0, 10.0), 10, 10);
/// grid.set(2, 3, 4.5)?;
/// let value = grid.get(2, 3)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    /// Grid values, shape (height, width)
    data: Array2<f64>,
    transform: GridTransform,
}

impl RasterGrid {
    /// Create a `width × height` grid filled with the no-value sentinel
    pub fn new(transform: GridTransform, width: usize, height: usize) -> Self {
        Self {
            data: Array2::from_elem((height, width), f64::NAN),
            transform,
        }
    }

    /// Create a grid from row-major values
    pub fn from_vec(
        transform: GridTransform,
        width: usize,
        height: usize,
        data: Vec<f64>,
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::InvalidDimensions { width, height });
        }

        let array = Array2::from_shape_vec((height, width), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            transform,
        })
    }

    // Dimensions

    /// Number of columns
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.height(),
                cols: self.width(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.data.nrows(),
                cols: self.data.ncols(),
            }),
        }
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    // Georeferencing

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size
    }

    /// Planar extent (min_x, min_y, max_x, max_y)
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.transform.extent(self.width(), self.height())
    }

    /// Planar coordinates of the centre of cell (row, col)
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.cell_center(col, row)
    }

    // Statistics

    /// Min, max, mean and count over cells holding a value
    pub fn statistics(&self) -> GridStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &v in self.data.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return GridStatistics {
                min: None,
                max: None,
                mean: None,
                valid_count: 0,
                nodata_count: self.len(),
            };
        }

        GridStatistics {
            min: Some(min),
            max: Some(max),
            mean: Some(sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
