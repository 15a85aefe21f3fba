//! PNG encoding of rendered grids

use image::{ImageFormat, RgbaImage};
use nitrogis_core::raster::RasterGrid;
use nitrogis_core::{Error, Result};
use std::io::Cursor;
use std::path::Path;

use crate::render::{grid_to_rgba, ColormapParams};

/// Render `grid` into an RGBA image, one pixel per cell.
pub fn render_image(grid: &RasterGrid, params: &ColormapParams) -> Result<RgbaImage> {
    let width = u32::try_from(grid.width()).map_err(|_| Error::InvalidDimensions {
        width: grid.width(),
        height: grid.height(),
    })?;
    let height = u32::try_from(grid.height()).map_err(|_| Error::InvalidDimensions {
        width: grid.width(),
        height: grid.height(),
    })?;

    RgbaImage::from_raw(width, height, grid_to_rgba(grid, params)).ok_or(Error::InvalidDimensions {
        width: grid.width(),
        height: grid.height(),
    })
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| Error::Image(e.to_string()))?;
    Ok(bytes.into_inner())
}

/// Write an image to `path` as PNG.
pub fn write_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image
        .save_with_format(path.as_ref(), ImageFormat::Png)
        .map_err(|e| Error::Image(format!("{}: {}", path.as_ref().display(), e)))
}
