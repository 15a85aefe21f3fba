//! One analysis pass: IDW surface, zonal means, regression
//!
//! ```text
//! wells ──► NeighborIndex ──► IDW grid ──► zonal means ──► OLS
//!                                 │
//!                                 └──► overlay image + bounds
//! ```

use nitrogis_algorithms::interpolation::{build_idw_grid, GridSpec, IdwParams, NeighborIndex};
use nitrogis_algorithms::statistics::{fit_ols, zonal_means, RegressionResult, ZonalRow};
use nitrogis_colormap::RgbaImage;
use nitrogis_core::raster::RasterGrid;
use nitrogis_core::{Reprojector, Result, TractPolygon, TransverseMercator, WellPoint};
use nitrogis_parallel::CancelToken;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::raster::{grid_bounds, render_overlay, Bounds};
use crate::units::OutcomeUnits;

/// Inputs of a single run, already in planar coordinates.
#[derive(Debug, Clone, Copy)]
pub struct RunInput<'a> {
    pub wells: &'a [WellPoint],
    pub tracts: &'a [TractPolygon],
    pub params: IdwParams,
    /// Grid cell edge in metres
    pub cell_size: f64,
}

/// Everything a single run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub grid: RasterGrid,
    pub image: RgbaImage,
    pub bounds: Bounds,
    pub zonal_table: Vec<ZonalRow>,
    pub regression: RegressionResult,
    pub units: OutcomeUnits,
}

/// Numeric part shared by single runs and sweeps
pub(crate) struct Analysis {
    pub grid: RasterGrid,
    pub zonal_table: Vec<ZonalRow>,
    pub regression: Result<RegressionResult>,
}

pub(crate) fn analyse(
    index: &NeighborIndex,
    spec: &GridSpec,
    tracts: &[TractPolygon],
    params: &IdwParams,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<Analysis> {
    let grid = build_idw_grid(index, spec, params, &config.limits(), cancel)?;
    cancel.check()?;

    let zonal_table = zonal_means(&grid, tracts, config.containment.as_containment());
    let empty = zonal_table.iter().filter(|r| r.cell_count == 0).count();
    debug!(
        power = params.power,
        tracts = zonal_table.len(),
        empty,
        "zonal means"
    );

    let regression = fit_ols(&zonal_table, params.power);
    Ok(Analysis {
        grid,
        zonal_table,
        regression,
    })
}

/// Run the whole chain once in the Wisconsin Transverse Mercator frame.
pub fn run_once(input: &RunInput<'_>, config: &PipelineConfig, cancel: &CancelToken) -> Result<RunOutput> {
    run_once_with(input, config, &TransverseMercator::wisconsin(), cancel)
}

/// [`run_once`] with an explicit reprojector for the output bounds.
///
/// Any failure fails the whole call; no partial output is returned.
pub fn run_once_with(
    input: &RunInput<'_>,
    config: &PipelineConfig,
    reprojector: &dyn Reprojector,
    cancel: &CancelToken,
) -> Result<RunOutput> {
    config.validate()?;
    input.params.validate()?;
    let limits = config.limits();
    limits.check_neighbors(input.params.neighbors)?;

    let spec = GridSpec::covering(input.wells, input.tracts, input.cell_size, config.margin, &limits)?
        .with_batch_rows(config.batch_rows);
    info!(
        width = spec.width,
        height = spec.height,
        cell_size = input.cell_size,
        "grid"
    );

    let index = NeighborIndex::build(input.wells)?;
    let analysis = analyse(&index, &spec, input.tracts, &input.params, config, cancel)?;
    let regression = analysis.regression?;
    info!(
        power = regression.power,
        n = regression.n,
        slope = regression.slope,
        r2 = regression.r_squared,
        p = regression.p_value,
        "regression"
    );

    let bounds = grid_bounds(&analysis.grid, reprojector)?;
    let image = render_overlay(&analysis.grid, config)?;

    Ok(RunOutput {
        grid: analysis.grid,
        image,
        bounds,
        zonal_table: analysis.zonal_table,
        regression,
        units: OutcomeUnits::infer(input.tracts),
    })
}
