//! Point-in-polygon rules for zonal aggregation
//!
//! Both implementations treat the boundary as inside, honour holes (a point
//! on a hole's edge is inside, a point strictly within a hole is not) and
//! ignore ring orientation.

use geo::{Coord, Intersects, LineString, MultiPolygon, Point, Polygon};

/// Decides whether a planar point belongs to a tract boundary.
pub trait Containment: Send + Sync {
    fn contains(&self, boundary: &MultiPolygon<f64>, x: f64, y: f64) -> bool;
}

/// Ray casting (crossing number) with an explicit on-segment test.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossingNumber;

/// Delegates to `geo`'s `Intersects`, which is boundary-inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoIntersects;

impl Containment for CrossingNumber {
    fn contains(&self, boundary: &MultiPolygon<f64>, x: f64, y: f64) -> bool {
        let p = Coord { x, y };
        boundary.0.iter().any(|poly| polygon_contains(poly, p))
    }
}

impl Containment for GeoIntersects {
    fn contains(&self, boundary: &MultiPolygon<f64>, x: f64, y: f64) -> bool {
        boundary.intersects(&Point::new(x, y))
    }
}

fn polygon_contains(poly: &Polygon<f64>, p: Coord<f64>) -> bool {
    let mut rings = std::iter::once(poly.exterior()).chain(poly.interiors());
    if rings.any(|ring| on_ring(ring, p)) {
        return true;
    }
    crosses_odd(poly.exterior(), p) && !poly.interiors().iter().any(|hole| crosses_odd(hole, p))
}

fn on_ring(ring: &LineString<f64>, p: Coord<f64>) -> bool {
    ring.lines().any(|seg| on_segment(seg.start, seg.end, p))
}

fn on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    if p.x < a.x.min(b.x) || p.x > a.x.max(b.x) || p.y < a.y.min(b.y) || p.y > a.y.max(b.y) {
        return false;
    }
    let lhs = (b.x - a.x) * (p.y - a.y);
    let rhs = (b.y - a.y) * (p.x - a.x);
    // relative tolerance keeps the test scale-free for metre-sized coordinates
    (lhs - rhs).abs() <= 4.0 * f64::EPSILON * (lhs.abs() + rhs.abs())
}

/// Odd number of edge crossings of a ray cast towards +x
fn crosses_odd(ring: &LineString<f64>, p: Coord<f64>) -> bool {
    ring.lines().fold(false, |inside, seg| {
        let (a, b) = (seg.start, seg.end);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                return !inside;
            }
        }
        inside
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square_with_hole(clockwise: bool) -> MultiPolygon<f64> {
        let mut poly = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0)
            ],
            interiors: [
                [
                    (x: 4.0, y: 4.0),
                    (x: 6.0, y: 4.0),
                    (x: 6.0, y: 6.0),
                    (x: 4.0, y: 6.0)
                ]
            ]
        );
        if clockwise {
            let ext: Vec<Coord<f64>> = poly.exterior().coords().rev().copied().collect();
            let holes: Vec<LineString<f64>> = poly
                .interiors()
                .iter()
                .map(|h| h.coords().rev().copied().collect())
                .collect();
            poly = Polygon::new(LineString::from(ext), holes);
        }
        MultiPolygon::new(vec![poly])
    }

    fn check(rule: &dyn Containment) {
        for clockwise in [false, true] {
            let mp = square_with_hole(clockwise);
            // interior
            assert!(rule.contains(&mp, 2.0, 2.0));
            assert!(rule.contains(&mp, 8.0, 5.0));
            // exterior boundary, edge and vertex
            assert!(rule.contains(&mp, 0.0, 5.0));
            assert!(rule.contains(&mp, 10.0, 10.0));
            assert!(rule.contains(&mp, 5.0, 0.0));
            // hole edge counts, hole interior does not
            assert!(rule.contains(&mp, 4.0, 5.0));
            assert!(!rule.contains(&mp, 5.0, 5.0));
            // outside
            assert!(!rule.contains(&mp, -0.1, 5.0));
            assert!(!rule.contains(&mp, 5.0, 10.5));
        }
    }

    #[test]
    fn test_crossing_number() {
        check(&CrossingNumber);
    }

    #[test]
    fn test_geo_intersects() {
        check(&GeoIntersects);
    }

    #[test]
    fn test_multipolygon_parts() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let b = polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0), (x: 5.0, y: 6.0)];
        let mp = MultiPolygon::new(vec![a, b]);
        for rule in [&CrossingNumber as &dyn Containment, &GeoIntersects] {
            assert!(rule.contains(&mp, 0.5, 0.5));
            assert!(rule.contains(&mp, 5.5, 5.5));
            assert!(!rule.contains(&mp, 3.0, 3.0));
        }
    }

    #[test]
    fn test_large_planar_coordinates() {
        let poly = polygon![
            (x: 560_000.0, y: 280_000.0),
            (x: 570_000.0, y: 281_000.0),
            (x: 569_000.0, y: 292_000.0),
            (x: 559_000.0, y: 290_000.0)
        ];
        let mp = MultiPolygon::new(vec![poly]);
        // midpoint of the first edge
        assert!(CrossingNumber.contains(&mp, 565_000.0, 280_500.0));
        assert!(CrossingNumber.contains(&mp, 564_000.0, 285_000.0));
        assert!(!CrossingNumber.contains(&mp, 565_000.0, 280_400.0));
    }
}
