//! Core type definitions for PCF classification

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Label returned by an untrained (zero-cone) model
pub const UNTRAINED_LABEL: f64 = 0.0;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1, -1, or 0 for an untrained model)
    pub label: f64,
    /// Minimum conic function value over all cones
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Prediction of a model without cones
    pub fn untrained() -> Self {
        Self {
            label: UNTRAINED_LABEL,
            decision_value: f64::INFINITY,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Training sample with a dense feature vector and label
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Feature vector
    pub features: Vec<f64>,
    /// Class label (+1 or -1)
    pub label: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: Vec<f64>, label: f64) -> Self {
        Self { features, label }
    }

    /// Feature dimension
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}

/// A fitted polyhedral conic function
///
/// g(x) = w.(x - center) + xi * ||x - center||_1 - gamma
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub center: Vec<f64>,
    pub w: Vec<f64>,
    pub xi: f64,
    pub gamma: f64,
    /// Objective value of the QP that produced this cone
    pub objective: f64,
}

impl Cone {
    /// Evaluate the conic function at `x`
    ///
    /// `x` must have the same dimension as the cone.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.center.len());
        let mut linear = 0.0;
        let mut l1 = 0.0;
        for ((&xi, &ci), &wi) in x.iter().zip(&self.center).zip(&self.w) {
            let diff = xi - ci;
            linear += wi * diff;
            l1 += diff.abs();
        }
        linear + self.xi * l1 - self.gamma
    }

    /// Whether `x` lies inside the cone (g(x) <= 0)
    pub fn covers(&self, x: &[f64]) -> bool {
        self.evaluate(x) <= 0.0
    }

    /// Feature dimension
    pub fn dim(&self) -> usize {
        self.center.len()
    }
}

/// Behaviour when the positive class has no active points left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptyBPolicy {
    /// Drop the positive-class term and its constraints
    #[default]
    Omit,
    /// Report a solve failure without calling the solver
    Fail,
}

/// Configuration of the cone construction loop
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Penalty weight of positive-class violations
    pub c: f64,
    /// Regularization weight
    pub lambda: f64,
    /// Empty positive class handling
    pub empty_b: EmptyBPolicy,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            lambda: 0.01,
            empty_b: EmptyBPolicy::Omit,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Check hyperparameters before fitting
    pub fn validate(&self) -> crate::core::Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(crate::core::RPCFError::InvalidParameter(format!(
                "C must be positive and finite, got: {}",
                self.c
            )));
        }
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(crate::core::RPCFError::InvalidParameter(format!(
                "lambda must be positive and finite, got: {}",
                self.lambda
            )));
        }
        Ok(())
    }
}

/// Parameters of the variable neighborhood search selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VnsConfig {
    /// Size of the nearest-neighbor index query
    pub k_neighbors: usize,
    /// Number of search rounds per center selection
    pub max_vns_iter: usize,
    /// Neighbors scored per round
    pub max_neighbors_check: usize,
    /// Capacity of the per-selection score cache
    pub cache_capacity: usize,
}

impl Default for VnsConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 10,
            max_vns_iter: 5,
            max_neighbors_check: 5,
            cache_capacity: 256,
        }
    }
}

/// Configuration for the bundled QP solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Tolerance on the maximal projected-gradient violation
    pub epsilon: f64,
    /// Maximum number of passes over the dual coordinates
    pub max_iterations: usize,
    /// Optional wall-clock limit per solve
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            max_iterations: 100_000,
            time_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_cone() -> Cone {
        Cone {
            center: vec![1.0, 2.0],
            w: vec![0.5, -1.0],
            xi: 0.25,
            gamma: 1.5,
            objective: 0.1,
        }
    }

    #[test]
    fn test_cone_at_center_is_minus_gamma() {
        let cone = sample_cone();
        assert_eq!(cone.evaluate(&[1.0, 2.0]), -1.5);
        assert!(cone.covers(&[1.0, 2.0]));
    }

    #[test]
    fn test_cone_evaluation() {
        let cone = sample_cone();
        // diff = (2, -1): w.diff = 1 + 1 = 2, l1 = 3
        assert_relative_eq!(cone.evaluate(&[3.0, 1.0]), 2.0 + 0.75 - 1.5);
        assert!(!cone.covers(&[3.0, 1.0]));
    }

    #[test]
    fn test_prediction() {
        let pred = Prediction::new(1.0, 2.5);
        assert_eq!(pred.label, 1.0);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::new(-1.0, -1.8);
        assert_eq!(neg_pred.confidence(), 1.8);

        assert_eq!(Prediction::untrained().label, UNTRAINED_LABEL);
    }

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.c, 1.0);
        assert_eq!(config.lambda, 0.01);
        assert_eq!(config.empty_b, EmptyBPolicy::Omit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_training_config_rejects_bad_values() {
        let mut config = TrainingConfig::default();
        config.c = 0.0;
        assert!(config.validate().is_err());

        let mut config = TrainingConfig::default();
        config.lambda = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vns_config_default() {
        let config = VnsConfig::default();
        assert_eq!(config.k_neighbors, 10);
        assert_eq!(config.max_vns_iter, 5);
        assert_eq!(config.max_neighbors_check, 5);
    }
}
