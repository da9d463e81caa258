//! Center selection strategies
//!
//! A selector picks the next cone center from the current active negative set.
//! Active sets are handed over explicitly on every call.

pub mod random;
pub mod vns;

pub use self::random::*;
pub use self::vns::*;

use crate::core::{EmptyBPolicy, Sample, VnsConfig};
use crate::solver::QpSolver;
use crate::subproblem::Subproblem;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything a selector may look at when choosing a center
pub struct SelectionContext<'a> {
    pub samples: &'a [Sample],
    pub active_a: &'a [usize],
    pub active_b: &'a [usize],
    pub c: f64,
    pub lambda: f64,
    pub empty_b: EmptyBPolicy,
    pub solver: &'a dyn QpSolver,
}

impl<'a> SelectionContext<'a> {
    /// Subproblem centered at sample `center`
    pub fn subproblem(&self, center: usize) -> Subproblem<'a> {
        Subproblem {
            samples: self.samples,
            active_a: self.active_a,
            active_b: self.active_b,
            center: &self.samples[center].features,
            c: self.c,
            lambda: self.lambda,
            empty_b: self.empty_b,
        }
    }
}

/// Strategy for choosing the next cone center
pub trait CenterSelector {
    /// Return a sample index taken from `ctx.active_a`
    ///
    /// `ctx.active_a` is never empty when this is called.
    fn select_center(&mut self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> usize;

    /// Short name used in logs and model metadata
    fn name(&self) -> &'static str;
}

/// Serializable choice of selector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Uniform random draw
    #[default]
    Random,
    /// Variable neighborhood search
    Vns(VnsConfig),
}

impl SelectionStrategy {
    /// Instantiate the selector
    pub fn build(&self) -> Box<dyn CenterSelector> {
        match self {
            SelectionStrategy::Random => Box::new(RandomSelector::new()),
            SelectionStrategy::Vns(config) => Box::new(VnsSelector::new(config.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionStrategy::Random => "random",
            SelectionStrategy::Vns(_) => "vns",
        }
    }
}

/// Uniform position in `0..len`
///
/// Both selectors draw their first candidate through this so that a VNS run
/// without search rounds matches random selection.
pub(crate) fn draw_position(rng: &mut StdRng, len: usize) -> usize {
    rng.gen_range(0..len)
}
