//! Grid-to-RGBA rendering using color schemes.

use crate::scheme::{evaluate, ColorScheme, Rgb};
use nitrogis_core::raster::RasterGrid;

/// Parameters for colormap rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below this are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above this are clamped.
    pub max: f64,
    /// Alpha of valid pixels.
    pub alpha: u8,
    /// Color for no-value pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Create params with the given scheme; min/max must be set separately
    /// or use [`stretch_params`] to derive them from data.
    pub fn new(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, 0.0, 1.0)
    }

    /// Create params with explicit min/max range.
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            alpha: 255,
            nodata_color: [0, 0, 0, 0],
        }
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Linear-interpolated percentile of ascending `sorted`, `p` in [0, 100].
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = (p.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Range from the `(low, high)` percentiles of the grid's finite cells.
///
/// A grid without finite cells gets the range [0, 1]; a collapsed range is
/// widened by 1e-6 so normalization stays defined.
pub fn stretch_params(grid: &RasterGrid, scheme: ColorScheme, (low, high): (f64, f64)) -> ColormapParams {
    let mut values: Vec<f64> = grid.data().iter().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);

    let (min, max) = match (percentile(&values, low), percentile(&values, high)) {
        (Some(min), Some(max)) if max > min => (min, max),
        (Some(min), Some(_)) => (min, min + 1e-6),
        _ => (0.0, 1.0),
    };

    ColormapParams::with_range(scheme, min, max)
}

/// Convert a grid to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `width * height * 4` in row-major order;
/// pixel (0, 0) is grid cell (row 0, col 0), the north-west corner.
/// Non-finite cells are rendered with `params.nodata_color`.
pub fn grid_to_rgba(grid: &RasterGrid, params: &ColormapParams) -> Vec<u8> {
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    let mut rgba = Vec::with_capacity(grid.len() * 4);
    for &v in grid.data().iter() {
        if v.is_finite() {
            let t = (v - params.min) * inv_range;
            let Rgb { r, g, b } = evaluate(params.scheme, t);
            rgba.extend_from_slice(&[r, g, b, params.alpha]);
        } else {
            rgba.extend_from_slice(&params.nodata_color);
        }
    }

    rgba
}
