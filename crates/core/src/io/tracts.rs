//! Census tract GeoJSON reader

use crate::crs::Reprojector;
use crate::error::{Error, Result};
use crate::vector::TractPolygon;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, Value};
use serde_json::Value as JsonValue;
use std::path::Path;

const ZONE_KEYS: &[&str] = &["GEOID10", "GEOID", "geoid10", "geoid"];
const RATE_KEY: &str = "canrate";
const CASE_KEYS: &[&str] = &["cases", "count", "cancer", "incidences", "case_cnt", "num_cases"];
const POP_KEYS: &[&str] = &["pop", "population", "pop2010", "tot_pop", "total_pop", "pop_total"];

/// Read tracts from a GeoJSON FeatureCollection in geographic degrees.
///
/// The zone key comes from the first present of `GEOID10`, `GEOID`, `geoid10`,
/// `geoid`; features without one are skipped. The outcome is `canrate`, or
/// `cases / pop` from common field names when `canrate` is absent.
pub fn read_tracts_geojson<P: AsRef<Path>>(
    path: P,
    reprojector: &dyn Reprojector,
) -> Result<Vec<TractPolygon>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_tracts(&text, reprojector)
}

/// Same as [`read_tracts_geojson`] for an in-memory document.
pub fn parse_tracts(text: &str, reprojector: &dyn Reprojector) -> Result<Vec<TractPolygon>> {
    let geojson: GeoJson = text.parse()?;
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(Error::Other(
                "expected a Feature or FeatureCollection of tracts".into(),
            ))
        }
    };

    let mut tracts = Vec::with_capacity(features.len());
    for feature in &features {
        let Some(zone) = zone_key(feature) else {
            continue;
        };
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };

        let boundary = match &geometry.value {
            Value::Polygon(rings) => MultiPolygon::new(vec![project_polygon(rings, reprojector)?]),
            Value::MultiPolygon(polys) => MultiPolygon::new(
                polys
                    .iter()
                    .map(|rings| project_polygon(rings, reprojector))
                    .collect::<Result<Vec<_>>>()?,
            ),
            _ => continue,
        };

        tracts.push(TractPolygon::new(zone, boundary, outcome(feature)));
    }

    Ok(tracts)
}

fn zone_key(feature: &Feature) -> Option<String> {
    ZONE_KEYS
        .iter()
        .filter_map(|k| feature.property(k))
        .find_map(|v| match v {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn number(value: &JsonValue) -> Option<f64> {
    let v = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    v.filter(|v| v.is_finite())
}

fn first_number(feature: &Feature, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| feature.property(k))
        .find_map(number)
}

fn outcome(feature: &Feature) -> Option<f64> {
    if let Some(rate) = feature.property(RATE_KEY).and_then(number) {
        return Some(rate);
    }

    let cases = first_number(feature, CASE_KEYS)?;
    let pop = first_number(feature, POP_KEYS)?;
    (pop > 0.0).then(|| cases / pop)
}

fn project_polygon(rings: &[Vec<Vec<f64>>], reprojector: &dyn Reprojector) -> Result<Polygon<f64>> {
    let mut projected = rings
        .iter()
        .map(|ring| project_ring(ring, reprojector))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let exterior = projected
        .next()
        .ok_or_else(|| Error::Other("polygon without an exterior ring".into()))?;
    Ok(Polygon::new(exterior, projected.collect()))
}

fn project_ring(ring: &[Vec<f64>], reprojector: &dyn Reprojector) -> Result<LineString<f64>> {
    ring.iter()
        .map(|pos| {
            if pos.len() < 2 {
                return Err(Error::Other(format!("invalid position {:?}", pos)));
            }
            let (x, y) = reprojector.to_planar(pos[0], pos[1])?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::from)
}
