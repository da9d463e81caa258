//! Variable neighborhood search center selection
//!
//! Starting from a random incumbent, each round scores up to
//! `max_neighbors_check` nearest neighbors of the incumbent by solving the full
//! cone subproblem around them. The score of a candidate is the number of
//! active negative points its cone would remove. The first neighbor beating the
//! best score so far becomes the incumbent (first improvement); a round
//! without improvement shakes the incumbent to a random active point.

use super::{draw_position, CenterSelector, SelectionContext};
use crate::cache::ScoreCache;
use crate::core::VnsConfig;
use crate::knn::NeighborIndex;
use log::debug;
use rand::rngs::StdRng;

/// VNS-driven center selector
#[derive(Debug, Clone)]
pub struct VnsSelector {
    config: VnsConfig,
    solves: usize,
}

impl VnsSelector {
    pub fn new(config: VnsConfig) -> Self {
        Self { config, solves: 0 }
    }

    pub fn config(&self) -> &VnsConfig {
        &self.config
    }

    /// Total subproblems solved for scoring since creation
    pub fn solves(&self) -> usize {
        self.solves
    }

    /// Number of active negative points removed by a cone centered at
    /// `candidate`, `None` if the solve failed
    fn score(&mut self, ctx: &SelectionContext<'_>, candidate: usize) -> Option<usize> {
        self.solves += 1;
        match ctx.subproblem(candidate).solve(ctx.solver) {
            Ok(cone) => Some(
                ctx.active_a
                    .iter()
                    .filter(|&&i| cone.covers(&ctx.samples[i].features))
                    .count(),
            ),
            Err(failure) => {
                debug!("VNS candidate {candidate} skipped: {failure}");
                None
            }
        }
    }
}

impl CenterSelector for VnsSelector {
    fn select_center(&mut self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> usize {
        let active_a = ctx.active_a;
        let mut incumbent = draw_position(rng, active_a.len());

        let index = NeighborIndex::build(ctx.samples, active_a, self.config.k_neighbors);
        if index.k() < 1 {
            return active_a[incumbent];
        }

        let mut cache = ScoreCache::new(self.config.cache_capacity);
        let mut best: Option<(usize, usize)> = None;

        for round in 0..self.config.max_vns_iter {
            let neighbors = index.neighbors(incumbent);
            let mut improved = false;

            for &candidate in neighbors.iter().take(self.config.max_neighbors_check) {
                if candidate == incumbent && round > 0 {
                    continue;
                }

                let sample = active_a[candidate];
                let score = match cache.get(sample) {
                    Some(score) => score,
                    None => {
                        let score = self.score(ctx, sample);
                        cache.put(sample, score);
                        score
                    }
                };
                let Some(score) = score else { continue };

                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((candidate, score));
                    incumbent = candidate;
                    improved = true;
                    break;
                }
            }

            if improved {
                debug!(
                    "VNS round {}: incumbent {} removes {} points",
                    round,
                    active_a[incumbent],
                    best.map_or(0, |(_, s)| s)
                );
            } else {
                incumbent = draw_position(rng, active_a.len());
                debug!("VNS round {}: shake to {}", round, active_a[incumbent]);
            }
        }

        let stats = cache.stats();
        debug!(
            "VNS selection done: {} cache hits, {} misses, {}/{} entries, hit rate {:.2}",
            stats.hits,
            stats.misses,
            stats.size,
            stats.capacity,
            cache.hit_rate()
        );

        match best {
            Some((position, _)) => active_a[position],
            None => active_a[incumbent],
        }
    }

    fn name(&self) -> &'static str {
        "vns"
    }
}
