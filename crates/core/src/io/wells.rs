//! Well sample CSV reader

use crate::crs::Reprojector;
use crate::error::Result;
use crate::vector::WellPoint;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct WellRecord {
    lon: f64,
    lat: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    nitrate: Option<f64>,
}

/// Read wells from a CSV file with `lon,lat,nitrate` columns (degrees).
///
/// Coordinates are projected with `reprojector`. Rows whose nitrate is empty,
/// unparsable or non-finite are skipped.
pub fn read_wells_csv<P: AsRef<Path>>(path: P, reprojector: &dyn Reprojector) -> Result<Vec<WellPoint>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_wells(file, reprojector)
}

/// Same as [`read_wells_csv`] for any reader.
pub fn read_wells<R: Read>(reader: R, reprojector: &dyn Reprojector) -> Result<Vec<WellPoint>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut wells = Vec::new();

    for record in rdr.deserialize() {
        let record: WellRecord = record?;
        let Some(nitrate) = record.nitrate.filter(|v| v.is_finite()) else {
            continue;
        };
        let (x, y) = reprojector.to_planar(record.lon, record.lat)?;
        wells.push(WellPoint::new(x, y, nitrate));
    }

    Ok(wells)
}
