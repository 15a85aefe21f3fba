//! Zonal means of a raster over tract polygons
//!
//! Each tract averages the finite cells whose centres it contains. Only
//! cells inside the tract's bounding rectangle are tested.

use nitrogis_core::raster::RasterGrid;
use nitrogis_core::TractPolygon;
use serde::{Deserialize, Serialize};

use crate::maybe_rayon::*;
use crate::vector::Containment;

/// Aggregate for one tract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonalRow {
    pub zone: String,
    /// Cells with a finite value whose centre lies in the tract
    pub cell_count: usize,
    /// `None` when no cell contributed
    pub mean_nitrate: Option<f64>,
    /// Outcome carried over from the tract
    pub outcome: Option<f64>,
}

/// Compute the mean raster value per tract.
///
/// Rows are returned in tract input order. A tract that contains no finite
/// cell centre is still reported, with `cell_count = 0` and no mean.
pub fn zonal_means(
    grid: &RasterGrid,
    tracts: &[TractPolygon],
    containment: &dyn Containment,
) -> Vec<ZonalRow> {
    (0..tracts.len())
        .into_par_iter()
        .map(|i| zonal_row(grid, &tracts[i], containment))
        .collect()
}

fn zonal_row(grid: &RasterGrid, tract: &TractPolygon, containment: &dyn Containment) -> ZonalRow {
    let mut sum = 0.0;
    let mut count = 0usize;

    let window = tract
        .extent()
        .and_then(|e| grid.transform().center_window(e.as_tuple(), grid.width(), grid.height()));

    if let Some(((col_lo, col_hi), (row_lo, row_hi))) = window {
        let data = grid.data();
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let value = data[[row, col]];
                if !value.is_finite() {
                    continue;
                }
                let (x, y) = grid.cell_center(row, col);
                if containment.contains(&tract.boundary, x, y) {
                    sum += value;
                    count += 1;
                }
            }
        }
    }

    ZonalRow {
        zone: tract.zone.clone(),
        cell_count: count,
        mean_nitrate: (count > 0).then(|| sum / count as f64),
        outcome: tract.outcome,
    }
}
