//! Packaging of the numeric grid for display: overlay image and bounds

use nitrogis_colormap::{render_image, stretch_params, RgbaImage};
use nitrogis_core::raster::RasterGrid;
use nitrogis_core::{Reprojector, Result};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Geographic envelope `[min_lon, min_lat, max_lon, max_lat]` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bounds(pub [f64; 4]);

impl Bounds {
    pub fn min_lon(&self) -> f64 {
        self.0[0]
    }

    pub fn min_lat(&self) -> f64 {
        self.0[1]
    }

    pub fn max_lon(&self) -> f64 {
        self.0[2]
    }

    pub fn max_lat(&self) -> f64 {
        self.0[3]
    }
}

/// Envelope of the four reprojected corners of the grid extent.
pub fn grid_bounds(grid: &RasterGrid, reprojector: &dyn Reprojector) -> Result<Bounds> {
    let (min_x, min_y, max_x, max_y) = grid.extent();
    reprojector
        .envelope_to_geographic(min_x, min_y, max_x, max_y)
        .map(Bounds)
}

/// Overlay image with the configured percentile stretch, ramp and alpha.
pub fn render_overlay(grid: &RasterGrid, config: &PipelineConfig) -> Result<RgbaImage> {
    let params = stretch_params(grid, config.colormap, config.stretch_percentiles)
        .with_alpha(config.png_alpha);
    tracing::debug!(min = params.min, max = params.max, "overlay stretch");
    render_image(grid, &params)
}
