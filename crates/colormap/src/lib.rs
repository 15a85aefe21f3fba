//! # NitroGIS Colormap
//!
//! Color mapping and grid-to-PNG rendering for NitroGIS overlays.
//!
//! Provides a few color schemes plus a generic multi-stop interpolation
//! engine. [`stretch_params`] derives a percentile range from the data,
//! [`grid_to_rgba`] turns a `RasterGrid` into an RGBA pixel buffer and
//! [`render_image`] wraps that buffer as an `image::RgbaImage`.
//!
//! ## Usage
//!
//! ```ignore
//! use nitrogis_colormap::{render_image, stretch_params, write_png, ColorScheme};
//!
//! let params = stretch_params(&grid, ColorScheme::Nitrate, (2.0, 98.0)).with_alpha(180);
//! write_png(&render_image(&grid, &params)?, "nitrate.png")?;
//! ```

mod png;
mod render;
mod scheme;

pub use png::{encode_png, render_image, write_png};
pub use render::{grid_to_rgba, percentile, stretch_params, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};

pub use image::RgbaImage;
