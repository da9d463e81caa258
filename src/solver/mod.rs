//! QP solver contract and the bundled solver
//!
//! The cone subproblem is handed to a solver in "slack form": variables `u`
//! with a separable quadratic regularizer, optional lower bounds, and a list
//! of hinge rows. Each row `k` stands for the constraint pair
//!
//! ```text
//! r_k . u + 1 <= s_k,   s_k >= 0
//! ```
//!
//! with objective contribution `c_k * s_k`, so the full problem reads
//!
//! ```text
//! minimize   lambda * ||u||^2 + sum_k c_k * s_k
//! subject to the row constraints and u_i >= lb_i where a bound is given
//! ```
//!
//! Any solver that implements [`QpSolver`] for this form can stand in for
//! [`DualCoordinateDescent`].

pub mod dual_cd;

pub use self::dual_cd::*;

use crate::core::SolveFailure;

/// Outcome of a single QP solve
pub type SolveResult = std::result::Result<QpSolution, SolveFailure>;

/// One slack-penalised linear constraint
#[derive(Debug, Clone, PartialEq)]
pub struct HingeRow {
    /// Coefficients `r_k`, one per variable
    pub coefficients: Vec<f64>,
    /// Objective weight `c_k` of the row's slack
    pub weight: f64,
}

/// Quadratic program in slack form
#[derive(Debug, Clone, PartialEq)]
pub struct SlackQp {
    /// Number of primal variables
    pub n_vars: usize,
    /// Regularization weight `lambda`
    pub regularization: f64,
    /// Per-variable lower bound, `None` for a free variable
    pub lower_bounds: Vec<Option<f64>>,
    /// Hinge rows
    pub rows: Vec<HingeRow>,
}

impl SlackQp {
    /// Create an empty problem over `n_vars` free variables
    pub fn new(n_vars: usize, regularization: f64) -> Self {
        Self {
            n_vars,
            regularization,
            lower_bounds: vec![None; n_vars],
            rows: Vec::new(),
        }
    }

    /// Set a lower bound on variable `i`
    pub fn with_lower_bound(mut self, i: usize, bound: f64) -> Self {
        self.lower_bounds[i] = Some(bound);
        self
    }

    /// Append a hinge row
    pub fn push_row(&mut self, coefficients: Vec<f64>, weight: f64) {
        self.rows.push(HingeRow {
            coefficients,
            weight,
        });
    }

    /// Primal objective at `x`, slacks taken at their optimal value
    pub fn objective(&self, x: &[f64]) -> f64 {
        let reg: f64 = x.iter().map(|v| v * v).sum();
        let loss: f64 = self
            .rows
            .iter()
            .map(|row| {
                let margin = dot(&row.coefficients, x) + 1.0;
                row.weight * margin.max(0.0)
            })
            .sum();
        self.regularization * reg + loss
    }

    /// Check the problem is well formed before solving
    pub fn validate(&self) -> std::result::Result<(), SolveFailure> {
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(SolveFailure::Numerical(format!(
                "regularization must be positive, got {}",
                self.regularization
            )));
        }
        if self.lower_bounds.len() != self.n_vars {
            return Err(SolveFailure::Numerical(format!(
                "expected {} bounds, got {}",
                self.n_vars,
                self.lower_bounds.len()
            )));
        }
        if self.lower_bounds.iter().flatten().any(|b| !b.is_finite()) {
            return Err(SolveFailure::Infeasible(
                "non-finite variable bound".to_string(),
            ));
        }
        for (k, row) in self.rows.iter().enumerate() {
            if row.coefficients.len() != self.n_vars {
                return Err(SolveFailure::Numerical(format!(
                    "row {k} has {} coefficients, expected {}",
                    row.coefficients.len(),
                    self.n_vars
                )));
            }
            if !row.weight.is_finite()
                || row.weight < 0.0
                || row.coefficients.iter().any(|c| !c.is_finite())
            {
                return Err(SolveFailure::Numerical(format!(
                    "row {k} contains invalid values"
                )));
            }
        }
        Ok(())
    }
}

/// Primal solution of a [`SlackQp`]
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    /// Optimal primal variables `u`
    pub x: Vec<f64>,
    /// Objective value at `x`
    pub objective: f64,
    /// Solver passes performed
    pub iterations: usize,
}

/// Capability to solve slack-form QPs
pub trait QpSolver {
    /// Solve `qp`, returning a failure value instead of panicking
    fn solve(&self, qp: &SlackQp) -> SolveResult;
}

impl<S: QpSolver + ?Sized> QpSolver for &S {
    fn solve(&self, qp: &SlackQp) -> SolveResult {
        (**self).solve(qp)
    }
}

impl<S: QpSolver + ?Sized> QpSolver for Box<S> {
    fn solve(&self, qp: &SlackQp) -> SolveResult {
        (**self).solve(qp)
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_counts_only_positive_margins() {
        let mut qp = SlackQp::new(1, 0.5);
        qp.push_row(vec![1.0], 2.0);
        qp.push_row(vec![-3.0], 1.0);

        // x = 1: reg 0.5, row0 margin 2 -> 4, row1 margin -2 -> 0
        assert_eq!(qp.objective(&[1.0]), 4.5);
    }

    #[test]
    fn test_validate_rejects_malformed_rows() {
        let mut qp = SlackQp::new(2, 1.0);
        qp.push_row(vec![1.0], 1.0);
        assert!(matches!(qp.validate(), Err(SolveFailure::Numerical(_))));
    }

    #[test]
    fn test_validate_rejects_non_finite_bound() {
        let qp = SlackQp::new(1, 1.0).with_lower_bound(0, f64::NAN);
        assert!(matches!(qp.validate(), Err(SolveFailure::Infeasible(_))));
    }

    #[test]
    fn test_validate_rejects_zero_regularization() {
        let qp = SlackQp::new(1, 0.0);
        assert!(qp.validate().is_err());
    }
}
