//! # NitroGIS Core
//!
//! Core types, errors and I/O for the NitroGIS nitrate/cancer analysis.
//!
//! This crate provides:
//! - `RasterGrid`: georeferenced grid of interpolated values
//! - `GridTransform`: north-up placement of a grid in planar space
//! - `CRS` and `Reprojector`: geographic ↔ planar conversion (EPSG:3071)
//! - `WellPoint` / `TractPolygon`: analysis inputs
//! - Readers for wells CSV and tracts GeoJSON

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::{Reprojector, TransverseMercator, CRS};
pub use error::{Error, Result};
pub use raster::{GridTransform, RasterGrid};
pub use vector::{Extent, TractPolygon, WellPoint};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::{Reprojector, TransverseMercator, CRS};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GridTransform, RasterGrid};
    pub use crate::vector::{Extent, TractPolygon, WellPoint};
}
