//! Point and polygon inputs of the analysis
//!
//! Both live in the planar analysis CRS (EPSG:3071, metres).

use geo::{BoundingRect, MultiPolygon};
use serde::{Deserialize, Serialize};

/// A sampled well: planar location and nitrate concentration (mg/L).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellPoint {
    pub x: f64,
    pub y: f64,
    pub nitrate: f64,
}

impl WellPoint {
    pub fn new(x: f64, y: f64, nitrate: f64) -> Self {
        Self { x, y, nitrate }
    }

    /// Squared Euclidean distance to a planar point
    #[inline]
    pub fn dist_sq(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        dx * dx + dy * dy
    }
}

/// A census tract: zone key, boundary and outcome value.
///
/// The outcome (cancer rate) is carried exactly as supplied, whether a raw
/// rate or a proportion. `None` marks a tract without a usable rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TractPolygon {
    pub zone: String,
    pub boundary: MultiPolygon<f64>,
    pub outcome: Option<f64>,
}

impl TractPolygon {
    pub fn new(zone: impl Into<String>, boundary: MultiPolygon<f64>, outcome: Option<f64>) -> Self {
        Self {
            zone: zone.into(),
            boundary,
            outcome,
        }
    }

    /// Planar bounding rectangle, `None` for an empty boundary
    pub fn extent(&self) -> Option<Extent> {
        self.boundary.bounding_rect().map(|r| Extent {
            min_x: r.min().x,
            min_y: r.min().y,
            max_x: r.max().x,
            max_y: r.max().y,
        })
    }
}

/// Axis-aligned planar rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow by `margin` on every side
    pub fn padded(&self, margin: f64) -> Extent {
        Extent {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Inclusive point test
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// As the `(min_x, min_y, max_x, max_y)` tuple used by grid windows
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Extent of a set of wells, `None` when empty
    pub fn of_wells(wells: &[WellPoint]) -> Option<Extent> {
        wells.iter().fold(None, |acc: Option<Extent>, w| {
            let pt = Extent::new(w.x, w.y, w.x, w.y);
            Some(match acc {
                Some(e) => e.union(&pt),
                None => pt,
            })
        })
    }

    /// Extent of a set of tracts, `None` when all boundaries are empty
    pub fn of_tracts(tracts: &[TractPolygon]) -> Option<Extent> {
        tracts
            .iter()
            .filter_map(TractPolygon::extent)
            .reduce(|a, b| a.union(&b))
    }
}
