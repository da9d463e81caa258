//! Cone construction loop
//!
//! Repeatedly selects a center from the uncovered negative points, fits a cone
//! around it and prunes both active sets with the new cone:
//!
//! ```text
//! SelectingCenter -> SolvingSubproblem -> Pruning -> SelectingCenter ...
//!                                     \-> Failed      (solver gave no cone)
//! SelectingCenter -> Done                              (no negatives left)
//! SelectingCenter -> Rejected   (selector returned an inactive index)
//! ```
//!
//! Every successful iteration removes at least the chosen center from the
//! active negative set, so a fit performs at most as many iterations as there
//! are negative samples.

use crate::core::{
    Cone, Dataset, RPCFError, Result, Sample, SolveFailure, TrainingConfig,
};
use crate::model::ConeModel;
use crate::selector::{CenterSelector, SelectionContext, SelectionStrategy};
use crate::solver::{DualCoordinateDescent, QpSolver};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Why a fit stopped
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Every negative sample is covered
    Exhausted,
    /// The solver produced no cone; the model holds the cones built so far
    SolverFailed(SolveFailure),
    /// The selector returned an index outside the active negative set
    InvalidCenter(usize),
}

/// Active-set sizes after one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationTrace {
    /// Sample index used as the cone center
    pub center: usize,
    pub remaining_a: usize,
    pub remaining_b: usize,
}

/// Summary of a construction run
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub termination: Termination,
    /// Negative samples still uncovered
    pub remaining_a: Vec<usize>,
    /// Positive samples still constraining the fit
    pub remaining_b: Vec<usize>,
    pub trace: Vec<IterationTrace>,
}

impl FitReport {
    /// Number of successful iterations
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }

    /// Whether the fit covered every negative sample
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Exhausted
    }
}

/// Fitted model together with its construction report
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub model: ConeModel,
    pub report: FitReport,
}

enum FitState {
    SelectingCenter,
    SolvingSubproblem(usize),
    Pruning(usize, Cone),
    Failed(SolveFailure),
    Rejected(usize),
    Done,
}

/// Drives selector, subproblem builder and solver to build a cone model
pub struct ConeTrainer<S: QpSolver> {
    solver: S,
    config: TrainingConfig,
    strategy: SelectionStrategy,
}

impl ConeTrainer<DualCoordinateDescent> {
    /// Trainer using the bundled dual coordinate descent solver
    pub fn with_default_solver(config: TrainingConfig, strategy: SelectionStrategy) -> Self {
        Self::new(DualCoordinateDescent::default(), config, strategy)
    }
}

impl<S: QpSolver> ConeTrainer<S> {
    /// Create a new trainer
    pub fn new(solver: S, config: TrainingConfig, strategy: SelectionStrategy) -> Self {
        Self {
            solver,
            config,
            strategy,
        }
    }

    /// Get the training configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Get the selection strategy
    pub fn strategy(&self) -> &SelectionStrategy {
        &self.strategy
    }

    /// Get the solver
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Fit a model on a dataset
    pub fn fit<D: Dataset>(&self, dataset: &D) -> Result<FitOutcome> {
        let samples = dataset.samples();
        self.fit_samples(&samples)
    }

    /// Fit a model on samples, seeding the RNG from the configuration
    pub fn fit_samples(&self, samples: &[Sample]) -> Result<FitOutcome> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut selector = self.strategy.build();
        self.fit_with_selector(samples, selector.as_mut(), &mut rng)
    }

    /// Fit with an explicit selector and RNG
    pub fn fit_with_selector(
        &self,
        samples: &[Sample],
        selector: &mut dyn CenterSelector,
        rng: &mut StdRng,
    ) -> Result<FitOutcome> {
        self.config.validate()?;
        validate_samples(samples)?;

        let mut active_a: Vec<usize> = Vec::new();
        let mut active_b: Vec<usize> = Vec::new();
        for (i, sample) in samples.iter().enumerate() {
            if sample.label < 0.0 {
                active_a.push(i);
            } else {
                active_b.push(i);
            }
        }

        info!(
            "Fitting cones with {} selection: |A| = {}, |B| = {}, C = {}, lambda = {}",
            selector.name(),
            active_a.len(),
            active_b.len(),
            self.config.c,
            self.config.lambda
        );

        let mut model = ConeModel::new();
        let mut trace = Vec::new();
        let mut state = FitState::SelectingCenter;

        let termination = loop {
            state = match state {
                FitState::SelectingCenter => {
                    if active_a.is_empty() {
                        FitState::Done
                    } else {
                        let ctx = self.context(samples, &active_a, &active_b);
                        let center = selector.select_center(&ctx, rng);
                        debug!("Selected center {center}");
                        if active_a.contains(&center) {
                            FitState::SolvingSubproblem(center)
                        } else {
                            FitState::Rejected(center)
                        }
                    }
                }
                FitState::SolvingSubproblem(center) => {
                    let ctx = self.context(samples, &active_a, &active_b);
                    match ctx.subproblem(center).solve(&self.solver) {
                        Ok(cone) => FitState::Pruning(center, cone),
                        Err(failure) => FitState::Failed(failure),
                    }
                }
                FitState::Pruning(center, cone) => {
                    let before = active_a.len();
                    active_a.retain(|&i| cone.evaluate(&samples[i].features) > 0.0);
                    active_b.retain(|&j| cone.evaluate(&samples[j].features) > 0.0);
                    debug_assert!(active_a.len() < before, "center must be removed");

                    model.push(cone);
                    trace.push(IterationTrace {
                        center,
                        remaining_a: active_a.len(),
                        remaining_b: active_b.len(),
                    });
                    info!(
                        "Iter {}: Remaining A: {}, B: {}",
                        trace.len(),
                        active_a.len(),
                        active_b.len()
                    );
                    FitState::SelectingCenter
                }
                FitState::Failed(failure) => {
                    warn!(
                        "Solver failed: {failure}. Stopping with {} cones",
                        model.len()
                    );
                    break Termination::SolverFailed(failure);
                }
                FitState::Rejected(center) => {
                    warn!(
                        "{} selector returned inactive index {center}. Stopping with {} cones",
                        selector.name(),
                        model.len()
                    );
                    break Termination::InvalidCenter(center);
                }
                FitState::Done => break Termination::Exhausted,
            };
        };

        Ok(FitOutcome {
            model,
            report: FitReport {
                termination,
                remaining_a: active_a,
                remaining_b: active_b,
                trace,
            },
        })
    }

    fn context<'a>(
        &'a self,
        samples: &'a [Sample],
        active_a: &'a [usize],
        active_b: &'a [usize],
    ) -> SelectionContext<'a> {
        SelectionContext {
            samples,
            active_a,
            active_b,
            c: self.config.c,
            lambda: self.config.lambda,
            empty_b: self.config.empty_b,
            solver: &self.solver,
        }
    }
}

/// Check labels are binary and feature vectors share one dimension
pub fn validate_samples(samples: &[Sample]) -> Result<()> {
    let first = samples.first().ok_or(RPCFError::EmptyDataset)?;
    let dim = first.dim();
    if dim == 0 {
        return Err(RPCFError::InvalidDataset(
            "Samples must have at least one feature".to_string(),
        ));
    }
    for sample in samples {
        if sample.label != 1.0 && sample.label != -1.0 {
            return Err(RPCFError::InvalidLabel(sample.label));
        }
        if sample.dim() != dim {
            return Err(RPCFError::DimensionMismatch {
                expected: dim,
                actual: sample.dim(),
            });
        }
        if sample.features.iter().any(|v| !v.is_finite()) {
            return Err(RPCFError::InvalidDataset(
                "Features must be finite".to_string(),
            ));
        }
    }
    Ok(())
}
