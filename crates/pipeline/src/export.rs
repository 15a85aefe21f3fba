//! Artifact writers: bounds JSON, tract tables, tract GeoJSON, sweep table,
//! overlay PNG and the run summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use nitrogis_algorithms::statistics::{RegressionResult, ZonalRow};
use nitrogis_colormap::write_png;
use nitrogis_core::{Reprojector, Result, TractPolygon};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::raster::Bounds;
use crate::run::RunOutput;
use crate::sweep::SweepRow;
use crate::units::OutcomeUnits;

/// `1.0`, `2.5`: the power as it appears in artifact names
pub fn power_tag(power: f64) -> String {
    format!("{:.1}", power)
}

pub fn overlay_file_name(power: f64) -> String {
    format!("nitrate_p{}.png", power_tag(power))
}

pub fn tract_table_file_name(power: f64) -> String {
    format!("tract_table_p{}.csv", power_tag(power))
}

pub fn tracts_geojson_file_name(power: f64) -> String {
    format!("tracts_p{}.geojson", power_tag(power))
}

pub fn sweep_file_name(neighbors: usize, cell_size: f64) -> String {
    format!("sensitivity_neighbors{}_cell{}.csv", neighbors, cell_size)
}

pub const BOUNDS_FILE_NAME: &str = "bounds.json";

pub fn write_bounds_json<P: AsRef<Path>>(path: P, bounds: &Bounds) -> Result<()> {
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(writer, bounds)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct TractRecord<'a> {
    #[serde(rename = "GEOID10")]
    zone: &'a str,
    cell_count: usize,
    mean_nitrate: Option<f64>,
    canrate: Option<f64>,
}

/// One row per tract, in tract order; absent values are empty fields.
pub fn write_tract_table<P: AsRef<Path>>(path: P, rows: &[ZonalRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        wtr.serialize(TractRecord {
            zone: &row.zone,
            cell_count: row.cell_count,
            mean_nitrate: row.mean_nitrate,
            canrate: row.outcome,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SweepRecord {
    power: f64,
    n: Option<usize>,
    r2: Option<f64>,
    slope: Option<f64>,
    intercept: Option<f64>,
    p_value: Option<f64>,
    ci_low: Option<f64>,
    ci_high: Option<f64>,
    error: Option<String>,
}

impl From<&SweepRow> for SweepRecord {
    fn from(row: &SweepRow) -> Self {
        match &row.result {
            Ok(fit) => SweepRecord {
                power: row.power,
                n: Some(fit.n),
                r2: Some(fit.r_squared),
                slope: Some(fit.slope),
                intercept: Some(fit.intercept),
                p_value: Some(fit.p_value),
                ci_low: Some(fit.slope_ci.0),
                ci_high: Some(fit.slope_ci.1),
                error: None,
            },
            Err(e) => SweepRecord {
                power: row.power,
                n: None,
                r2: None,
                slope: None,
                intercept: None,
                p_value: None,
                ci_low: None,
                ci_high: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// One row per swept power, failed powers carry their error message.
pub fn write_sweep_table<P: AsRef<Path>>(path: P, rows: &[SweepRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        wtr.serialize(SweepRecord::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Tracts with their zonal mean and outcome, back in geographic degrees.
///
/// `rows` must be the zonal table computed for `tracts` (same order).
pub fn tracts_feature_collection(
    tracts: &[TractPolygon],
    rows: &[ZonalRow],
    reprojector: &dyn Reprojector,
) -> Result<FeatureCollection> {
    let features = tracts
        .iter()
        .zip(rows)
        .map(|(tract, row)| {
            let polygons = tract
                .boundary
                .0
                .iter()
                .map(|poly| {
                    std::iter::once(poly.exterior())
                        .chain(poly.interiors())
                        .map(|ring| {
                            ring.coords()
                                .map(|c| reprojector.to_geographic(c.x, c.y).map(|(lon, lat)| vec![lon, lat]))
                                .collect::<Result<Vec<_>>>()
                        })
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;

            let mut properties = JsonObject::new();
            properties.insert("GEOID10".into(), json!(tract.zone));
            properties.insert("canrate".into(), json!(tract.outcome));
            properties.insert("mean_nitrate".into(), json!(row.mean_nitrate));

            Ok(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::MultiPolygon(polygons))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

pub fn write_tracts_geojson<P: AsRef<Path>>(
    path: P,
    tracts: &[TractPolygon],
    rows: &[ZonalRow],
    reprojector: &dyn Reprojector,
) -> Result<()> {
    let collection = tracts_feature_collection(tracts, rows, reprojector)?;
    std::fs::write(path.as_ref(), GeoJson::from(collection).to_string())?;
    Ok(())
}

/// Regression block of the run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsSummary {
    pub power: f64,
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
    pub p_value: f64,
    pub ci: [f64; 2],
    pub n: usize,
    pub rate_units: OutcomeUnits,
    pub rate_scale: f64,
}

impl OlsSummary {
    pub fn new(fit: &RegressionResult, units: OutcomeUnits) -> Self {
        Self {
            power: fit.power,
            slope: fit.slope,
            intercept: fit.intercept,
            r2: fit.r_squared,
            p_value: fit.p_value,
            ci: [fit.slope_ci.0, fit.slope_ci.1],
            n: fit.n,
            rate_units: units,
            rate_scale: units.display_scale(),
        }
    }
}

/// Paths of the written artifacts plus the regression summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub png: PathBuf,
    pub csv: PathBuf,
    pub geojson: PathBuf,
    pub bounds_file: PathBuf,
    pub bounds: Bounds,
    pub ols: OlsSummary,
}

/// Write every artifact of a single run into `out_dir`.
pub fn write_run_artifacts(
    out_dir: &Path,
    output: &RunOutput,
    tracts: &[TractPolygon],
    reprojector: &dyn Reprojector,
) -> Result<RunSummary> {
    std::fs::create_dir_all(out_dir)?;
    let power = output.regression.power;

    let png = out_dir.join(overlay_file_name(power));
    write_png(&output.image, &png)?;

    let csv = out_dir.join(tract_table_file_name(power));
    write_tract_table(&csv, &output.zonal_table)?;

    let geojson = out_dir.join(tracts_geojson_file_name(power));
    write_tracts_geojson(&geojson, tracts, &output.zonal_table, reprojector)?;

    let bounds_file = out_dir.join(BOUNDS_FILE_NAME);
    write_bounds_json(&bounds_file, &output.bounds)?;

    tracing::info!(dir = %out_dir.display(), "artifacts written");
    Ok(RunSummary {
        png,
        csv,
        geojson,
        bounds_file,
        bounds: output.bounds,
        ols: OlsSummary::new(&output.regression, output.units),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use nitrogis_core::{Error, TransverseMercator};

    #[test]
    fn artifact_names() {
        assert_eq!(overlay_file_name(2.0), "nitrate_p2.0.png");
        assert_eq!(tract_table_file_name(2.5), "tract_table_p2.5.csv");
        assert_eq!(tracts_geojson_file_name(1.0), "tracts_p1.0.geojson");
        assert_eq!(sweep_file_name(12, 1000.0), "sensitivity_neighbors12_cell1000.csv");
        assert_eq!(sweep_file_name(8, 250.5), "sensitivity_neighbors8_cell250.5.csv");
    }

    #[test]
    fn tract_table_leaves_missing_values_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let rows = vec![
            ZonalRow {
                zone: "55025000100".into(),
                cell_count: 4,
                mean_nitrate: Some(2.5),
                outcome: Some(0.01),
            },
            ZonalRow {
                zone: "55025000200".into(),
                cell_count: 0,
                mean_nitrate: None,
                outcome: None,
            },
        ];
        write_tract_table(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "GEOID10,cell_count,mean_nitrate,canrate");
        assert_eq!(lines[1], "55025000100,4,2.5,0.01");
        assert_eq!(lines[2], "55025000200,0,,");
    }

    #[test]
    fn sweep_table_keeps_error_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        let rows = vec![
            SweepRow {
                power: 1.0,
                result: Ok(RegressionResult {
                    n: 10,
                    slope: 0.5,
                    intercept: 1.0,
                    r_squared: 0.25,
                    p_value: 0.01,
                    slope_ci: (0.1, 0.9),
                    power: 1.0,
                }),
            },
            SweepRow {
                power: 2.0,
                result: Err(Error::InsufficientData { valid: 1, required: 3 }),
            },
        ];
        write_sweep_table(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "power,n,r2,slope,intercept,p_value,ci_low,ci_high,error");
        assert_eq!(lines[1], "1.0,10,0.25,0.5,1.0,0.01,0.1,0.9,");
        assert!(lines[2].starts_with("2.0,,,,,,,,"));
        assert!(lines[2].contains("Insufficient data"));
    }

    #[test]
    fn tracts_return_to_degrees() {
        let tm = TransverseMercator::wisconsin();
        let (x0, y0) = tm.to_planar(-89.5, 43.0).unwrap();
        let poly = polygon![
            (x: x0, y: y0),
            (x: x0 + 1000.0, y: y0),
            (x: x0 + 1000.0, y: y0 + 1000.0),
            (x: x0, y: y0 + 1000.0)
        ];
        let tracts = vec![TractPolygon::new("55025000100", MultiPolygon::new(vec![poly]), Some(0.02))];
        let rows = vec![ZonalRow {
            zone: "55025000100".into(),
            cell_count: 1,
            mean_nitrate: Some(3.0),
            outcome: Some(0.02),
        }];

        let fc = tracts_feature_collection(&tracts, &rows, &tm).unwrap();
        assert_eq!(fc.features.len(), 1);
        let feature = &fc.features[0];
        assert_eq!(feature.property("GEOID10"), Some(&json!("55025000100")));
        assert_eq!(feature.property("mean_nitrate"), Some(&json!(3.0)));

        let Some(Value::MultiPolygon(polys)) = feature.geometry.as_ref().map(|g| &g.value) else {
            panic!("expected a MultiPolygon");
        };
        let first = &polys[0][0][0];
        assert!((first[0] + 89.5).abs() < 1e-6);
        assert!((first[1] - 43.0).abs() < 1e-6);
    }

    #[test]
    fn bounds_file_is_a_plain_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOUNDS_FILE_NAME);
        write_bounds_json(&path, &Bounds([-90.0, 42.5, -89.0, 43.5])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, json!([-90.0, 42.5, -89.0, 43.5]));
    }
}
