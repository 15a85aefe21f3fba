//! Raster data structures

mod geotransform;
mod grid;

pub use geotransform::GridTransform;
pub use grid::{GridStatistics, RasterGrid};
