//! IDW power sensitivity sweep
//!
//! Repeats the analysis for each requested power against one shared
//! neighbor index and one grid layout. Per-power failures stay in their
//! row; cancellation and resource limits abort the sweep.

use nitrogis_algorithms::interpolation::{GridSpec, IdwParams, NeighborIndex};
use nitrogis_algorithms::statistics::RegressionResult;
use nitrogis_core::{Error, Result, TractPolygon, WellPoint};
use nitrogis_parallel::{CancelToken, ParallelStrategy, ProcessingMode};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::run::analyse;

/// Powers swept when the caller gives none
pub const DEFAULT_POWERS: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

/// Inputs of a sweep, already in planar coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SweepInput<'a> {
    pub wells: &'a [WellPoint],
    pub tracts: &'a [TractPolygon],
    pub powers: &'a [f64],
    pub neighbors: usize,
    /// Grid cell edge in metres
    pub cell_size: f64,
}

/// Outcome for one power, in the caller's order.
#[derive(Debug)]
pub struct SweepRow {
    pub power: f64,
    pub result: Result<RegressionResult>,
}

/// Run the analysis once per power.
///
/// Returns one row per entry of `powers`, in the same order, regardless of
/// how rows were scheduled. Invalid powers, too few usable tracts and
/// degenerate predictors are reported in their row. Resource limits are
/// checked once up front; they and cancellation fail the whole sweep.
pub fn run_sweep(input: &SweepInput<'_>, config: &PipelineConfig, cancel: &CancelToken) -> Result<Vec<SweepRow>> {
    config.validate()?;
    if input.neighbors == 0 {
        return Err(Error::invalid_parameter("neighbors", input.neighbors, "must be at least 1"));
    }
    let limits = config.limits();
    limits.check_neighbors(input.neighbors)?;

    let spec = GridSpec::covering(input.wells, input.tracts, input.cell_size, config.margin, &limits)?
        .with_batch_rows(config.batch_rows);
    let index = NeighborIndex::build(input.wells)?;
    info!(
        powers = input.powers.len(),
        neighbors = input.neighbors,
        width = spec.width,
        height = spec.height,
        workers = config.workers,
        "sweep"
    );

    let mode = ProcessingMode::with_workers(config.workers);
    let results = mode.par_map(0..input.powers.len(), |i| {
        let power = input.powers[i];
        cancel.check()?;
        let params = IdwParams::new(input.neighbors, power);
        let analysis = analyse(&index, &spec, input.tracts, &params, config, cancel)?;
        match &analysis.regression {
            Ok(fit) => debug!(power, r2 = fit.r_squared, slope = fit.slope, "sweep row"),
            Err(e) => debug!(power, error = %e, "sweep row failed"),
        }
        analysis.regression
    })?;

    if let Some(pos) = results.iter().position(|r| matches!(r, Err(e) if e.is_fatal())) {
        return Err(results
            .into_iter()
            .nth(pos)
            .and_then(|r| r.err())
            .unwrap_or(Error::Cancelled));
    }

    let rows: Vec<SweepRow> = input
        .powers
        .iter()
        .zip(results)
        .map(|(&power, result)| SweepRow { power, result })
        .collect();

    let failed = rows.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        warn!(failed, total = rows.len(), "some sweep powers failed");
    }
    Ok(rows)
}
