//! # NitroGIS Algorithms
//!
//! Numeric core of the nitrate/cancer analysis.
//!
//! ## Modules
//!
//! - **interpolation**: k-d tree neighbor index, IDW estimator, grid builder
//! - **statistics**: zonal means over tracts, OLS regression
//! - **vector**: point-in-polygon containment rules

pub mod interpolation;
pub(crate) mod maybe_rayon;
pub mod statistics;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        build_idw_grid, build_idw_grid_with, GridLimits, GridSpec, IdwParams, Interpolator, Neighbor, NeighborIndex,
    };
    pub use crate::statistics::{fit_ols, zonal_means, RegressionResult, ZonalRow};
    pub use crate::vector::{Containment, CrossingNumber, GeoIntersects};
    pub use nitrogis_core::prelude::*;
}
