//! Vector predicates used by the zonal aggregation

mod containment;

pub use containment::{Containment, CrossingNumber, GeoIntersects};
