//! Exact Euclidean k-nearest-neighbor index
//!
//! Brute force over the indexed points; queries return positions in
//! ascending distance order, ties broken by position.

use crate::core::Sample;

/// k-NN index over a subset of samples
#[derive(Debug, Clone)]
pub struct NeighborIndex<'a> {
    points: Vec<&'a [f64]>,
    k: usize,
}

impl<'a> NeighborIndex<'a> {
    /// Index the samples at `indices`, answering queries with at most `k`
    /// neighbors (clamped to the number of indexed points)
    pub fn build(samples: &'a [Sample], indices: &[usize], k: usize) -> Self {
        let points: Vec<&[f64]> = indices
            .iter()
            .map(|&i| samples[i].features.as_slice())
            .collect();
        let k = k.min(points.len());
        Self { points, k }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Effective neighbor count per query
    pub fn k(&self) -> usize {
        self.k
    }

    /// Positions of the `k` nearest indexed points to the point at
    /// `position`, the point itself included
    pub fn neighbors(&self, position: usize) -> Vec<usize> {
        let query = self.points[position];
        let mut ranked: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(j, p)| (squared_distance(query, p), j))
            .collect();

        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.into_iter().take(self.k).map(|(_, j)| j).collect()
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
