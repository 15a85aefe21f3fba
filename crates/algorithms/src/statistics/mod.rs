//! Statistics over the interpolated surface
//!
//! - **zonal**: mean raster value per tract
//! - **regression**: OLS of tract outcome on tract mean nitrate

pub mod regression;
pub mod zonal;

pub use regression::{fit_ols, ols, RegressionResult, MIN_OBSERVATIONS};
pub use zonal::{zonal_means, ZonalRow};
