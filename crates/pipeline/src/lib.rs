//! # NitroGIS Pipeline
//!
//! Drives the analysis end to end on planar inputs:
//!
//! - [`run_once`]: IDW grid, overlay image, bounds, zonal table and OLS fit
//!   for one parameter set
//! - [`run_sweep`]: the OLS fit for each IDW power of a list, sharing one
//!   neighbor index
//! - [`export`]: writers for the PNG, CSV, GeoJSON and JSON artifacts
//!
//! Configuration lives in [`PipelineConfig`]; cancellation and timeouts go
//! through [`CancelToken`].

pub mod config;
pub mod export;
pub mod raster;
pub mod run;
pub mod sweep;
pub mod units;

pub use config::{ContainmentRule, PipelineConfig};
pub use raster::Bounds;
pub use run::{run_once, run_once_with, RunInput, RunOutput};
pub use sweep::{run_sweep, SweepInput, SweepRow, DEFAULT_POWERS};
pub use units::OutcomeUnits;

pub use nitrogis_parallel::CancelToken;
