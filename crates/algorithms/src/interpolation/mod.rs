//! Spatial interpolation of well samples
//!
//! - kdtree: immutable neighbor index over wells
//! - IDW: Inverse Distance Weighting estimator
//! - grid: IDW evaluated over a regular north-up grid

mod grid;
mod idw;
pub mod kdtree;

pub use grid::{build_idw_grid, build_idw_grid_with, GridLimits, GridSpec};
pub use idw::{IdwParams, Interpolator};
pub use kdtree::{Neighbor, NeighborIndex};
