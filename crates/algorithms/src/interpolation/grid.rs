//! IDW surface on a regular grid
//!
//! [`GridSpec`] sizes a north-up grid to cover the wells and tracts, and
//! [`build_idw_grid`] evaluates the IDW estimator at every cell centre.
//! Rows are processed in batches so a [`CancelToken`] can stop the build
//! between batches.

use nitrogis_core::raster::{GridTransform, RasterGrid};
use nitrogis_core::{Error, Extent, Result, TractPolygon, WellPoint};
use nitrogis_parallel::CancelToken;
use serde::{Deserialize, Serialize};

use super::idw::{IdwParams, Interpolator};
use super::kdtree::NeighborIndex;
use crate::maybe_rayon::*;

/// Resource ceilings enforced before any allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLimits {
    /// Largest permitted `width * height`
    pub max_cells: u64,
    /// Largest permitted IDW neighbor count
    pub max_neighbors: usize,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_cells: 25_000_000,
            max_neighbors: 256,
        }
    }
}

impl GridLimits {
    /// Reject a neighbor count above `max_neighbors`
    pub fn check_neighbors(&self, neighbors: usize) -> Result<()> {
        if neighbors > self.max_neighbors {
            return Err(Error::ResourceLimit {
                what: "neighbors",
                requested: neighbors as u128,
                limit: self.max_neighbors as u128,
            });
        }
        Ok(())
    }

    /// Reject a grid whose cell count overflows or exceeds `max_cells`
    pub fn check_cells(&self, width: usize, height: usize) -> Result<()> {
        let requested = (width as u128) * (height as u128);
        if requested > self.max_cells as u128 {
            return Err(Error::ResourceLimit {
                what: "cells",
                requested,
                limit: self.max_cells as u128,
            });
        }
        Ok(())
    }
}

/// Placement and size of the output grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub transform: GridTransform,
    pub width: usize,
    pub height: usize,
    /// Rows evaluated between cancellation checks
    pub batch_rows: usize,
}

impl GridSpec {
    /// Grid of `cell_size` cells covering `extent`, anchored at its top-left corner.
    ///
    /// `width = ceil(extent_x / cell_size)` and likewise for `height`, each at
    /// least 1. The cell count is checked against `limits` here, before any
    /// raster is allocated.
    pub fn for_extent(extent: Extent, cell_size: f64, limits: &GridLimits) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::invalid_parameter(
                "cell_size",
                cell_size,
                "must be finite and greater than 0",
            ));
        }
        let finite = [extent.min_x, extent.min_y, extent.max_x, extent.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || extent.width() < 0.0 || extent.height() < 0.0 {
            return Err(Error::invalid_parameter(
                "extent",
                format!("{:?}", extent.as_tuple()),
                "must be finite and non-inverted",
            ));
        }

        let width = cells_along(extent.width(), cell_size, limits)?;
        let height = cells_along(extent.height(), cell_size, limits)?;
        limits.check_cells(width, height)?;

        Ok(Self {
            transform: GridTransform::new(extent.min_x, extent.max_y, cell_size),
            width,
            height,
            batch_rows: 64,
        })
    }

    /// Grid covering the union of well and tract extents padded by `margin`.
    pub fn covering(
        wells: &[WellPoint],
        tracts: &[TractPolygon],
        cell_size: f64,
        margin: f64,
        limits: &GridLimits,
    ) -> Result<Self> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(Error::invalid_parameter(
                "margin",
                margin,
                "must be finite and non-negative",
            ));
        }

        let extent = match (Extent::of_wells(wells), Extent::of_tracts(tracts)) {
            (Some(a), Some(b)) => a.union(&b),
            (Some(e), None) | (None, Some(e)) => e,
            (None, None) => {
                return Err(Error::InsufficientData {
                    valid: 0,
                    required: 1,
                })
            }
        };

        Self::for_extent(extent.padded(margin), cell_size, limits)
    }

    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows.max(1);
        self
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Planar extent `(min_x, min_y, max_x, max_y)` of the whole grid
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.transform.extent(self.width, self.height)
    }
}

/// Cells needed along one axis; computed in f64 so huge extents saturate
/// into a limit error instead of wrapping.
fn cells_along(length: f64, cell_size: f64, limits: &GridLimits) -> Result<usize> {
    let n = (length / cell_size).ceil().max(1.0);
    if n > limits.max_cells as f64 {
        return Err(Error::ResourceLimit {
            what: "cells",
            requested: n as u128,
            limit: limits.max_cells as u128,
        });
    }
    Ok(n as usize)
}

/// Evaluate IDW at every cell centre of `spec`.
///
/// Limits are checked before the output is allocated. Rows inside a batch
/// run on the rayon pool and are written in row-major order, so the result
/// is identical for any thread count. The token is polled before each batch.
pub fn build_idw_grid(
    index: &NeighborIndex,
    spec: &GridSpec,
    params: &IdwParams,
    limits: &GridLimits,
    cancel: &CancelToken,
) -> Result<RasterGrid> {
    build_idw_grid_with(index, spec, params, limits, cancel, |done, total| {
        tracing::trace!(done, total, "idw batch");
    })
}

/// [`build_idw_grid`] reporting `(rows_done, rows_total)` after each batch.
pub fn build_idw_grid_with<F>(
    index: &NeighborIndex,
    spec: &GridSpec,
    params: &IdwParams,
    limits: &GridLimits,
    cancel: &CancelToken,
    mut on_batch: F,
) -> Result<RasterGrid>
where
    F: FnMut(usize, usize),
{
    params.validate()?;
    limits.check_neighbors(params.neighbors)?;
    limits.check_cells(spec.width, spec.height)?;

    let interpolator = Interpolator::new(index, *params)?;
    let (width, height) = (spec.width, spec.height);
    let transform = spec.transform;
    let batch_rows = spec.batch_rows.max(1);

    let mut data: Vec<f64> = Vec::with_capacity(spec.cell_count());
    let mut row0 = 0;
    while row0 < height {
        cancel.check()?;
        let row1 = (row0 + batch_rows).min(height);

        let batch: Vec<f64> = (row0..row1)
            .into_par_iter()
            .flat_map(|row| {
                (0..width)
                    .map(|col| {
                        let (x, y) = transform.cell_center(col, row);
                        interpolator.estimate(x, y)
                    })
                    .collect::<Vec<f64>>()
            })
            .collect();

        data.extend(batch);
        on_batch(row1, height);
        row0 = row1;
    }

    RasterGrid::from_vec(transform, width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{polygon, MultiPolygon};

    fn square_tract(min: f64, max: f64) -> TractPolygon {
        let poly = polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
            (x: min, y: min)
        ];
        TractPolygon::new("t", MultiPolygon::new(vec![poly]), Some(1.0))
    }

    #[test]
    fn test_spec_covers_union() {
        let wells = vec![WellPoint::new(0.0, 0.0, 1.0), WellPoint::new(25.0, 5.0, 1.0)];
        let tracts = vec![square_tract(-5.0, 8.0)];
        let spec = GridSpec::covering(&wells, &tracts, 10.0, 0.0, &GridLimits::default()).unwrap();

        // x: [-5, 25] -> 3 cells, y: [-5, 8] -> 2 cells
        assert_eq!((spec.width, spec.height), (3, 2));
        assert_eq!(spec.transform.origin_x, -5.0);
        assert_eq!(spec.transform.origin_y, 8.0);
    }

    #[test]
    fn test_spec_margin_and_degenerate_extent() {
        let wells = vec![WellPoint::new(100.0, 100.0, 1.0)];
        let spec = GridSpec::covering(&wells, &[], 10.0, 0.0, &GridLimits::default()).unwrap();
        assert_eq!((spec.width, spec.height), (1, 1));

        let spec = GridSpec::covering(&wells, &[], 10.0, 15.0, &GridLimits::default()).unwrap();
        assert_eq!((spec.width, spec.height), (3, 3));
        assert_eq!(spec.transform.origin_x, 85.0);
    }

    #[test]
    fn test_spec_rejects_bad_inputs() {
        let wells = vec![WellPoint::new(0.0, 0.0, 1.0)];
        let limits = GridLimits::default();
        assert!(matches!(
            GridSpec::covering(&wells, &[], 0.0, 0.0, &limits),
            Err(Error::InvalidParameter { name: "cell_size", .. })
        ));
        assert!(GridSpec::covering(&wells, &[], f64::NAN, 0.0, &limits).is_err());
        assert!(GridSpec::covering(&wells, &[], 1.0, -1.0, &limits).is_err());
        assert!(matches!(
            GridSpec::covering(&[], &[], 1.0, 0.0, &limits),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_cell_limit_checked_before_allocation() {
        let wells = vec![WellPoint::new(0.0, 0.0, 1.0), WellPoint::new(1e6, 1e6, 1.0)];
        let limits = GridLimits {
            max_cells: 1_000,
            ..Default::default()
        };
        let err = GridSpec::covering(&wells, &[], 1.0, 0.0, &limits).unwrap_err();
        assert!(matches!(err, Error::ResourceLimit { what: "cells", .. }));

        // absurd extents saturate instead of overflowing
        let err = GridSpec::covering(&wells, &[], 1e-300, 0.0, &GridLimits::default()).unwrap_err();
        assert!(matches!(err, Error::ResourceLimit { .. }));
    }

    #[test]
    fn test_neighbor_limit() {
        let index = NeighborIndex::build(&[WellPoint::new(0.0, 0.0, 1.0)]).unwrap();
        let spec = GridSpec::for_extent(Extent::new(0.0, 0.0, 2.0, 2.0), 1.0, &GridLimits::default()).unwrap();
        let limits = GridLimits {
            max_neighbors: 8,
            ..Default::default()
        };
        let err = build_idw_grid(&index, &spec, &IdwParams::new(9, 2.0), &limits, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::ResourceLimit { what: "neighbors", .. }));
    }

    #[test]
    fn test_build_grid_values() {
        let wells = vec![WellPoint::new(0.5, 1.5, 4.0), WellPoint::new(2.5, 0.5, 8.0)];
        let index = NeighborIndex::build(&wells).unwrap();
        let spec = GridSpec::for_extent(Extent::new(0.0, 0.0, 3.0, 2.0), 1.0, &GridLimits::default())
            .unwrap()
            .with_batch_rows(1);

        let grid = build_idw_grid(
            &index,
            &spec,
            &IdwParams::new(2, 2.0),
            &GridLimits::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!((grid.width(), grid.height()), (3, 2));
        // row 0 is north: cell (0, 0) centre is (0.5, 1.5), a well
        assert_eq!(grid.get(0, 0).unwrap(), 4.0);
        assert_eq!(grid.get(1, 2).unwrap(), 8.0);

        // cell (0, 1) centre (1.5, 1.5): d = 1 to first well, sqrt(2) to second
        let expected = (4.0 * 1.0 + 8.0 * 0.5) / 1.5;
        assert_relative_eq!(grid.get(0, 1).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_batch_size_does_not_change_result() {
        let wells: Vec<WellPoint> = (0..50)
            .map(|i| WellPoint::new(((i * 17) % 40) as f64, ((i * 29) % 30) as f64, i as f64))
            .collect();
        let index = NeighborIndex::build(&wells).unwrap();
        let base = GridSpec::for_extent(Extent::new(0.0, 0.0, 40.0, 30.0), 1.0, &GridLimits::default()).unwrap();
        let params = IdwParams::new(6, 2.0);
        let token = CancelToken::new();

        let a = build_idw_grid(&index, &base.with_batch_rows(1), &params, &GridLimits::default(), &token).unwrap();
        let b = build_idw_grid(&index, &base.with_batch_rows(7), &params, &GridLimits::default(), &token).unwrap();
        let c = build_idw_grid(&index, &base.with_batch_rows(1000), &params, &GridLimits::default(), &token).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_cancelled_build_returns_error() {
        let index = NeighborIndex::build(&[WellPoint::new(0.0, 0.0, 1.0)]).unwrap();
        let spec = GridSpec::for_extent(Extent::new(0.0, 0.0, 10.0, 10.0), 1.0, &GridLimits::default()).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let err = build_idw_grid(&index, &spec, &IdwParams::default(), &GridLimits::default(), &token)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_cancel_between_batches() {
        let index = NeighborIndex::build(&[WellPoint::new(0.0, 0.0, 1.0), WellPoint::new(9.0, 9.0, 3.0)]).unwrap();
        let spec = GridSpec::for_extent(Extent::new(0.0, 0.0, 10.0, 10.0), 1.0, &GridLimits::default())
            .unwrap()
            .with_batch_rows(1);
        let token = CancelToken::new();
        let trigger = token.clone();

        let mut batches = 0;
        let result = build_idw_grid_with(&index, &spec, &IdwParams::default(), &GridLimits::default(), &token, |done, _| {
            batches += 1;
            if done == 3 {
                trigger.cancel();
            }
        });

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(batches, 3);
    }

    #[test]
    fn test_deadline_passing_mid_build() {
        let index = NeighborIndex::build(&[WellPoint::new(0.0, 0.0, 1.0)]).unwrap();
        let spec = GridSpec::for_extent(Extent::new(0.0, 0.0, 10.0, 10.0), 1.0, &GridLimits::default())
            .unwrap()
            .with_batch_rows(2);
        let token = CancelToken::with_timeout(std::time::Duration::from_millis(20));

        let mut batches = 0;
        let result = build_idw_grid_with(&index, &spec, &IdwParams::default(), &GridLimits::default(), &token, |_, _| {
            batches += 1;
            std::thread::sleep(std::time::Duration::from_millis(30));
        });

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(batches < 5, "{}", batches);
    }

    #[test]
    fn test_progress_reaches_total() {
        let index = NeighborIndex::build(&[WellPoint::new(0.0, 0.0, 1.0)]).unwrap();
        let spec = GridSpec::for_extent(Extent::new(0.0, 0.0, 10.0, 7.0), 1.0, &GridLimits::default())
            .unwrap()
            .with_batch_rows(3);
        let mut seen = Vec::new();
        build_idw_grid_with(&index, &spec, &IdwParams::default(), &GridLimits::default(), &CancelToken::new(), |done, total| {
            seen.push((done, total));
        })
        .unwrap();
        assert_eq!(seen, vec![(3, 7), (6, 7), (7, 7)]);
    }
}
