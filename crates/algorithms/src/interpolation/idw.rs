//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates nitrate at a location as a weighted average of the k nearest
//! wells, with weights inversely proportional to distance raised to a
//! power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use nitrogis_core::{Error, Result};
use serde::{Deserialize, Serialize};

use super::kdtree::NeighborIndex;

/// Parameters for IDW interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdwParams {
    /// Number of nearest wells per estimate (default: 12)
    pub neighbors: usize,
    /// Power parameter (default: 2.0).
    /// Higher values give more weight to nearby wells.
    pub power: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            neighbors: 12,
            power: 2.0,
        }
    }
}

impl IdwParams {
    pub fn new(neighbors: usize, power: f64) -> Self {
        Self { neighbors, power }
    }

    /// `neighbors >= 1` and `power` finite and positive
    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(Error::invalid_parameter(
                "neighbors",
                self.neighbors,
                "must be at least 1",
            ));
        }
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(Error::invalid_parameter(
                "power",
                self.power,
                "must be finite and greater than 0",
            ));
        }
        Ok(())
    }
}

/// IDW estimator bound to a neighbor index.
///
/// # Algorithm
///
/// ```text
/// z(x,y) = Σ(wi * zi) / Σ(wi)
/// where wi = 1 / di^p
/// ```
///
/// Weights are evaluated as `(d_min / di)^p`, which cancels in the ratio and
/// stays within `(0, 1]`, so large powers do not underflow to 0/0.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    index: &'a NeighborIndex,
    params: IdwParams,
}

impl<'a> Interpolator<'a> {
    pub fn new(index: &'a NeighborIndex, params: IdwParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { index, params })
    }

    /// Estimate nitrate at planar (x, y).
    ///
    /// A query that coincides with a well returns that well's value exactly
    /// (the lowest-index one among duplicates). An empty index yields `NaN`.
    pub fn estimate(&self, x: f64, y: f64) -> f64 {
        let neighbors = self.index.nearest(x, y, self.params.neighbors);
        let Some(nearest) = neighbors.first() else {
            return f64::NAN;
        };

        if nearest.distance == 0.0 {
            return nearest.well.nitrate;
        }

        let d_min = nearest.distance;
        let (sum_w, sum_wz) = neighbors.iter().fold((0.0, 0.0), |(sw, swz), n| {
            let w = (d_min / n.distance).powf(self.params.power);
            (sw + w, swz + w * n.well.nitrate)
        });

        // sum_w >= 1: the nearest well always carries weight 1
        sum_wz / sum_w
    }
}
