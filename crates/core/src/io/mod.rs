//! Readers for the analysis inputs
//!
//! Wells arrive as CSV and tracts as GeoJSON, both in geographic degrees;
//! each reader projects into the planar analysis CRS on the way in.

mod tracts;
mod wells;

pub use tracts::{parse_tracts, read_tracts_geojson};
pub use wells::{read_wells, read_wells_csv};
