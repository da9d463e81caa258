//! Hyperparameter search over (C, lambda)
//!
//! Every pair of the Cartesian grid is fitted on the training split and scored
//! by accuracy on the validation split. C is the outer loop and lambda the
//! inner one; the first pair reaching the best accuracy wins.

use crate::core::{Classifier, Result, RPCFError, Sample, TrainingConfig};
use crate::selector::SelectionStrategy;
use crate::solver::QpSolver;
use crate::trainer::{ConeTrainer, Termination};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Default candidate values for C
pub const DEFAULT_C_VALUES: [f64; 4] = [0.1, 1.0, 10.0, 100.0];

/// Default candidate values for lambda
pub const DEFAULT_LAMBDA_VALUES: [f64; 3] = [0.01, 0.1, 1.0];

/// Outcome of a single grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub c: f64,
    pub lambda: f64,
    /// Validation accuracy, `None` when the combination failed
    pub accuracy: Option<f64>,
    pub n_cones: usize,
    /// Why the combination failed
    pub error: Option<String>,
}

/// Best parameters found by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub c: f64,
    pub lambda: f64,
    /// Best validation accuracy, or -1 if no combination succeeded
    pub accuracy: f64,
    pub evaluated: Vec<GridPoint>,
}

impl GridSearchResult {
    /// Whether at least one combination produced a usable model
    pub fn found(&self) -> bool {
        self.accuracy >= 0.0
    }
}

/// Exhaustive search over candidate C and lambda values
#[derive(Debug, Clone)]
pub struct GridSearch {
    c_values: Vec<f64>,
    lambda_values: Vec<f64>,
    strategy: SelectionStrategy,
    base: TrainingConfig,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self {
            c_values: DEFAULT_C_VALUES.to_vec(),
            lambda_values: DEFAULT_LAMBDA_VALUES.to_vec(),
            strategy: SelectionStrategy::Random,
            base: TrainingConfig::default(),
        }
    }
}

impl GridSearch {
    /// Search over the default grid with random center selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidate C values
    pub fn with_c_values(mut self, values: Vec<f64>) -> Self {
        self.c_values = values;
        self
    }

    /// Replace the candidate lambda values
    pub fn with_lambda_values(mut self, values: Vec<f64>) -> Self {
        self.lambda_values = values;
        self
    }

    /// Center selection strategy used for every fit
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Base configuration (seed, empty-B policy); C and lambda are overridden
    pub fn with_base_config(mut self, config: TrainingConfig) -> Self {
        self.base = config;
        self
    }

    pub fn c_values(&self) -> &[f64] {
        &self.c_values
    }

    pub fn lambda_values(&self) -> &[f64] {
        &self.lambda_values
    }

    /// All (C, lambda) pairs in search order
    pub fn param_grid(&self) -> Vec<(f64, f64)> {
        self.c_values
            .iter()
            .flat_map(|&c| self.lambda_values.iter().map(move |&lambda| (c, lambda)))
            .collect()
    }

    /// Run the search with the given solver
    ///
    /// Failed combinations are skipped. A fit whose very first solve failed
    /// counts as failed. A fit that ends without cones because the training
    /// split has no negatives is scored like any other model; its sentinel
    /// predictions match no validation label.
    pub fn run<S: QpSolver>(
        &self,
        solver: &S,
        train: &[Sample],
        validation: &[Sample],
    ) -> GridSearchResult {
        let defaults = TrainingConfig::default();
        let mut best = GridSearchResult {
            c: defaults.c,
            lambda: defaults.lambda,
            accuracy: -1.0,
            evaluated: Vec::new(),
        };

        let grid = self.param_grid();
        info!("Starting grid search: {} combinations", grid.len());

        for (c, lambda) in grid {
            let config = TrainingConfig {
                c,
                lambda,
                ..self.base.clone()
            };

            let point = match self.evaluate(solver, config, train, validation) {
                Ok((accuracy, n_cones)) => {
                    debug!(
                        "C = {}, lambda = {}: accuracy {:.4} with {} cones",
                        c, lambda, accuracy, n_cones
                    );
                    if accuracy > best.accuracy {
                        best.c = c;
                        best.lambda = lambda;
                        best.accuracy = accuracy;
                    }
                    GridPoint {
                        c,
                        lambda,
                        accuracy: Some(accuracy),
                        n_cones,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("Skipping C = {}, lambda = {}: {}", c, lambda, e);
                    GridPoint {
                        c,
                        lambda,
                        accuracy: None,
                        n_cones: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            best.evaluated.push(point);
        }

        info!(
            "Best grid params: C = {}, lambda = {} (accuracy {:.4})",
            best.c, best.lambda, best.accuracy
        );
        best
    }

    fn evaluate<S: QpSolver>(
        &self,
        solver: &S,
        config: TrainingConfig,
        train: &[Sample],
        validation: &[Sample],
    ) -> Result<(f64, usize)> {
        if validation.is_empty() {
            return Err(RPCFError::EmptyDataset);
        }

        let trainer = ConeTrainer::new(solver, config, self.strategy.clone());
        let outcome = trainer.fit_samples(train)?;
        if outcome.model.is_empty() {
            if let Termination::SolverFailed(failure) = outcome.report.termination {
                return Err(RPCFError::SolverFailed(failure));
            }
        }

        let rows: Vec<Vec<f64>> = validation.iter().map(|s| s.features.clone()).collect();
        let predicted = outcome.model.predict_labels(&rows)?;
        let correct = predicted
            .iter()
            .zip(validation)
            .filter(|(p, s)| **p == s.label)
            .count();

        Ok((
            correct as f64 / validation.len() as f64,
            outcome.model.n_cones(),
        ))
    }
}
