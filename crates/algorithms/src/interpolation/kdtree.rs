//! 2D k-d tree over well locations
//!
//! Provides O(log n) average k-nearest-neighbor queries for IDW. The tree
//! is built once and is read-only afterwards, so it can be shared across
//! threads and across the powers of a sweep without locking.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use std::cmp::Ordering;

use nitrogis_core::{Error, Result, WellPoint};

/// Immutable spatial index over wells.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    nodes: Vec<KdNode>,
    /// Wells in caller order; node and result indices refer to this order
    wells: Vec<WellPoint>,
}

#[derive(Debug, Clone)]
struct KdNode {
    /// Index into `wells`
    well_idx: usize,
    /// Split dimension: 0 = x, 1 = y
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// One result of a neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub well: WellPoint,
    /// Position of the well in the slice the index was built from
    pub index: usize,
    /// Euclidean distance to the query point
    pub distance: f64,
}

/// Candidate ordering: distance first, then input order.
#[inline]
fn rank(a: (f64, usize), b: (f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl NeighborIndex {
    /// Build the index from wells in their input order.
    ///
    /// Fails with `InvalidParameter` when a well has a non-finite coordinate
    /// or a negative or non-finite nitrate value. An empty slice is allowed.
    pub fn build(wells: &[WellPoint]) -> Result<Self> {
        for (i, w) in wells.iter().enumerate() {
            if !w.x.is_finite() || !w.y.is_finite() {
                return Err(Error::invalid_parameter(
                    "well",
                    i,
                    format!("non-finite location ({}, {})", w.x, w.y),
                ));
            }
            if !w.nitrate.is_finite() || w.nitrate < 0.0 {
                return Err(Error::invalid_parameter(
                    "well",
                    i,
                    format!("nitrate must be finite and non-negative, got {}", w.nitrate),
                ));
            }
        }

        let mut indices: Vec<usize> = (0..wells.len()).collect();
        let mut nodes = Vec::with_capacity(wells.len());
        if !wells.is_empty() {
            build_recursive(wells, &mut indices, 0, &mut nodes);
        }

        Ok(Self {
            nodes,
            wells: wells.to_vec(),
        })
    }

    /// Number of wells in the index.
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// Wells in input order
    pub fn wells(&self) -> &[WellPoint] {
        &self.wells
    }

    /// The `min(k, n)` wells nearest to (qx, qy), ascending by distance.
    ///
    /// Equal distances are ordered by input index, so the result does not
    /// depend on how the tree happened to split duplicates.
    pub fn nearest(&self, qx: f64, qy: f64, k: usize) -> Vec<Neighbor> {
        let k = k.min(self.wells.len());
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }

        // ascending by rank; the worst kept candidate is last
        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.knn_recursive(0, qx, qy, k, &mut best);

        best.into_iter()
            .map(|(dist_sq, idx)| Neighbor {
                well: self.wells[idx],
                index: idx,
                distance: dist_sq.sqrt(),
            })
            .collect()
    }

    fn knn_recursive(
        &self,
        node_idx: usize,
        qx: f64,
        qy: f64,
        k: usize,
        best: &mut Vec<(f64, usize)>,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.wells[node.well_idx];

        let dx = qx - p.x;
        let dy = qy - p.y;
        let candidate = (dx * dx + dy * dy, node.well_idx);

        let full = best.len() >= k;
        if !full || best.last().is_some_and(|&worst| rank(candidate, worst).is_lt()) {
            let pos = best
                .binary_search_by(|entry| rank(*entry, candidate))
                .unwrap_or_else(|e| e);
            best.insert(pos, candidate);
            best.truncate(k);
        }

        let diff = if node.split_dim == 0 { dx } else { dy };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, qx, qy, k, best);
        }

        // `<=` keeps equal-distance wells on the far side reachable for the tie-break
        let visit_far = best.len() < k || best.last().is_some_and(|w| diff * diff <= w.0);
        if visit_far {
            if let Some(child) = second {
                self.knn_recursive(child, qx, qy, k, best);
            }
        }
    }
}

/// Recursively build the k-d tree over `indices`, returning the node index.
fn build_recursive(
    wells: &[WellPoint],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let split_dim = (depth % 2) as u8;
    let coord = |i: usize| if split_dim == 0 { wells[i].x } else { wells[i].y };

    indices.sort_by(|&a, &b| coord(a).total_cmp(&coord(b)).then(a.cmp(&b)));

    let median = indices.len() / 2;
    let node_idx = nodes.len();
    nodes.push(KdNode {
        well_idx: indices[median],
        split_dim,
        left: None,
        right: None,
    });

    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    if !left.is_empty() {
        let child = build_recursive(wells, left, depth + 1, nodes);
        nodes[node_idx].left = Some(child);
    }
    if !right.is_empty() {
        let child = build_recursive(wells, right, depth + 1, nodes);
        nodes[node_idx].right = Some(child);
    }

    node_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wells() -> Vec<WellPoint> {
        vec![
            WellPoint::new(2.0, 3.0, 10.0),
            WellPoint::new(5.0, 4.0, 20.0),
            WellPoint::new(9.0, 6.0, 30.0),
            WellPoint::new(4.0, 7.0, 40.0),
            WellPoint::new(8.0, 1.0, 50.0),
            WellPoint::new(7.0, 2.0, 60.0),
            WellPoint::new(1.0, 8.0, 70.0),
            WellPoint::new(6.0, 5.0, 80.0),
        ]
    }

    fn brute_force(wells: &[WellPoint], qx: f64, qy: f64, k: usize) -> Vec<(f64, usize)> {
        let mut all: Vec<(f64, usize)> = wells
            .iter()
            .enumerate()
            .map(|(i, w)| (w.dist_sq(qx, qy), i))
            .collect();
        all.sort_by(|a, b| rank(*a, *b));
        all.truncate(k);
        all
    }

    #[test]
    fn test_build_and_size() {
        let index = NeighborIndex::build(&sample_wells()).unwrap();
        assert_eq!(index.len(), 8);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = NeighborIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.nearest(0.0, 0.0, 3).is_empty());
    }

    #[test]
    fn test_rejects_bad_wells() {
        let nan = [WellPoint::new(f64::NAN, 0.0, 1.0)];
        assert!(matches!(
            NeighborIndex::build(&nan),
            Err(Error::InvalidParameter { .. })
        ));
        let negative = [WellPoint::new(0.0, 0.0, -1.0)];
        assert!(NeighborIndex::build(&negative).is_err());
    }

    #[test]
    fn test_exact_hit() {
        let index = NeighborIndex::build(&sample_wells()).unwrap();
        let hit = index.nearest(5.0, 4.0, 1);
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].distance, 0.0);
        assert_eq!(hit[0].index, 1);
        assert_eq!(hit[0].well.nitrate, 20.0);
    }

    #[test]
    fn test_matches_brute_force() {
        let wells = sample_wells();
        let index = NeighborIndex::build(&wells).unwrap();

        for qx in 0..10 {
            for qy in 0..10 {
                let (qx, qy) = (qx as f64 + 0.5, qy as f64 + 0.5);
                for k in [1, 3, 5] {
                    let got: Vec<usize> = index.nearest(qx, qy, k).iter().map(|n| n.index).collect();
                    let want: Vec<usize> = brute_force(&wells, qx, qy, k).iter().map(|c| c.1).collect();
                    assert_eq!(got, want, "query ({}, {}) k={}", qx, qy, k);
                }
            }
        }
    }

    #[test]
    fn test_sorted_ascending() {
        let index = NeighborIndex::build(&sample_wells()).unwrap();
        let results = index.nearest(5.0, 5.0, 5);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_k_larger_than_n() {
        let index = NeighborIndex::build(&sample_wells()).unwrap();
        assert_eq!(index.nearest(5.0, 5.0, 100).len(), 8);
    }

    #[test]
    fn test_huge_k_returns_all_wells() {
        let wells = vec![WellPoint::new(0.0, 0.0, 1.0), WellPoint::new(3.0, 4.0, 2.0)];
        let index = NeighborIndex::build(&wells).unwrap();
        for k in [usize::MAX, 1 << 40] {
            let got = index.nearest(0.0, 0.0, k);
            assert_eq!(got.len(), 2);
            assert_eq!(got[1].distance, 5.0);
        }
    }

    #[test]
    fn test_ties_break_by_input_order() {
        // four wells at distance 1 from the origin, plus duplicates
        let wells = vec![
            WellPoint::new(0.0, 1.0, 1.0),
            WellPoint::new(1.0, 0.0, 2.0),
            WellPoint::new(0.0, -1.0, 3.0),
            WellPoint::new(-1.0, 0.0, 4.0),
            WellPoint::new(1.0, 0.0, 5.0),
        ];
        let index = NeighborIndex::build(&wells).unwrap();
        let got: Vec<usize> = index.nearest(0.0, 0.0, 3).iter().map(|n| n.index).collect();
        assert_eq!(got, vec![0, 1, 2]);

        // coincident duplicates: lower index first
        let got: Vec<usize> = index.nearest(1.0, 0.0, 2).iter().map(|n| n.index).collect();
        assert_eq!(got, vec![1, 4]);
    }

    #[test]
    fn test_distances_invariant_to_input_order() {
        let wells: Vec<WellPoint> = (0..200)
            .map(|i| {
                let x = ((i * 37 + 11) % 101) as f64;
                let y = ((i * 53 + 7) % 97) as f64;
                WellPoint::new(x, y, i as f64)
            })
            .collect();
        let mut reversed = wells.clone();
        reversed.reverse();

        let a = NeighborIndex::build(&wells).unwrap();
        let b = NeighborIndex::build(&reversed).unwrap();

        for (qx, qy) in [(50.5, 48.5), (0.0, 0.0), (100.0, 96.0), (33.3, 66.6)] {
            let da: Vec<f64> = a.nearest(qx, qy, 12).iter().map(|n| n.distance).collect();
            let db: Vec<f64> = b.nearest(qx, qy, 12).iter().map(|n| n.distance).collect();
            assert_eq!(da, db);
        }
    }

    #[test]
    fn test_collinear_wells() {
        let wells: Vec<WellPoint> = (0..10).map(|i| WellPoint::new(i as f64, 0.0, i as f64)).collect();
        let index = NeighborIndex::build(&wells).unwrap();
        let knn = index.nearest(4.5, 0.0, 3);
        assert_eq!(knn.len(), 3);
        assert_eq!(knn[0].index, 4);
        assert_eq!(knn[1].index, 5);
    }
}
