//! Uniform random center selection

use super::{draw_position, CenterSelector, SelectionContext};
use rand::rngs::StdRng;

/// Picks a uniformly random point of the active negative set
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl RandomSelector {
    pub fn new() -> Self {
        Self
    }
}

impl CenterSelector for RandomSelector {
    fn select_center(&mut self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> usize {
        ctx.active_a[draw_position(rng, ctx.active_a.len())]
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
