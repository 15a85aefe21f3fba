//! Coordinate Reference System handling
//!
//! Analysis happens in a single planar CRS so that Euclidean distance between
//! wells approximates ground distance. Inputs arrive as geographic degrees and
//! the raster bounds leave as geographic degrees; [`Reprojector`] is the seam
//! between the two.

mod transverse_mercator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub use transverse_mercator::TransverseMercator;

/// Coordinate Reference System identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub const fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    /// WGS84 geographic CRS (EPSG:4326), used for display bounds
    pub const fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// NAD83 geographic CRS (EPSG:4269), the CRS of the source layers
    pub const fn nad83() -> Self {
        Self::from_epsg(4269)
    }

    /// NAD83(HARN) / Wisconsin Transverse Mercator (EPSG:3071), the analysis CRS
    pub const fn wisconsin_tm() -> Self {
        Self::from_epsg(3071)
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wisconsin_tm()
    }
}

/// Converts between geographic degrees and a planar metric CRS.
///
/// Implementations must be inverses of one another up to floating-point
/// tolerance inside their valid domain, and fail with
/// [`Error::Projection`](crate::Error::Projection) outside it.
pub trait Reprojector: Send + Sync {
    /// The planar CRS produced by [`to_planar`](Self::to_planar).
    fn planar_crs(&self) -> CRS;

    /// (lon, lat) in degrees → (x, y) in metres.
    fn to_planar(&self, lon: f64, lat: f64) -> Result<(f64, f64)>;

    /// (x, y) in metres → (lon, lat) in degrees.
    fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)>;

    /// Geographic envelope `[min_lon, min_lat, max_lon, max_lat]` of a planar
    /// rectangle, taken over its four corners.
    fn envelope_to_geographic(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<[f64; 4]> {
        let corners = [
            (min_x, min_y),
            (min_x, max_y),
            (max_x, min_y),
            (max_x, max_y),
        ];

        let mut out = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
        for &(x, y) in &corners {
            let (lon, lat) = self.to_geographic(x, y)?;
            out[0] = out[0].min(lon);
            out[1] = out[1].min(lat);
            out[2] = out[2].max(lon);
            out[3] = out[3].max(lat);
        }
        Ok(out)
    }
}
