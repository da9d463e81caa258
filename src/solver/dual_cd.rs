//! Dual coordinate descent for slack-form QPs
//!
//! Solves the Lagrangian dual of [`SlackQp`]:
//!
//! ```text
//! maximize   sum_k alpha_k + sum_i mu_i * lb_i - ||v||^2 / (4 * lambda)
//! subject to 0 <= alpha_k <= c_k,  mu_i >= 0
//! where      v = sum_k alpha_k * r_k - mu
//! ```
//!
//! The primal point is recovered as `u = -v / (2 * lambda)` and kept up to
//! date after every coordinate step, so each step is an exact one-dimensional
//! Newton update clipped to its box.

use crate::core::{SolveFailure, SolverConfig};
use crate::solver::{dot, QpSolution, QpSolver, SlackQp, SolveResult};
use log::{debug, warn};
use std::time::Instant;

/// Dual coordinate descent solver
#[derive(Debug, Clone, Default)]
pub struct DualCoordinateDescent {
    config: SolverConfig,
}

impl DualCoordinateDescent {
    /// Create a solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl QpSolver for DualCoordinateDescent {
    fn solve(&self, qp: &SlackQp) -> SolveResult {
        qp.validate()?;

        let started = Instant::now();
        let n = qp.n_vars;
        let two_lambda = 2.0 * qp.regularization;

        let row_norms: Vec<f64> = qp
            .rows
            .iter()
            .map(|row| dot(&row.coefficients, &row.coefficients))
            .collect();
        let bounded: Vec<(usize, f64)> = qp
            .lower_bounds
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.map(|b| (i, b)))
            .collect();

        let mut alpha = vec![0.0; qp.rows.len()];
        let mut mu = vec![0.0; bounded.len()];
        let mut u = vec![0.0; n];

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            iterations += 1;
            let mut max_violation: f64 = 0.0;

            for (k, row) in qp.rows.iter().enumerate() {
                let grad = 1.0 + dot(&row.coefficients, &u);
                let upper = row.weight;

                let projected = if alpha[k] <= 0.0 {
                    grad.max(0.0)
                } else if alpha[k] >= upper {
                    grad.min(0.0)
                } else {
                    grad
                };
                max_violation = max_violation.max(projected.abs());
                if projected == 0.0 {
                    continue;
                }

                let new_alpha = if row_norms[k] > 0.0 {
                    (alpha[k] + grad * two_lambda / row_norms[k]).clamp(0.0, upper)
                } else {
                    // Constant gradient; the row never touches u
                    upper
                };
                let delta = new_alpha - alpha[k];
                if delta != 0.0 {
                    alpha[k] = new_alpha;
                    let step = delta / two_lambda;
                    for (uj, &rj) in u.iter_mut().zip(&row.coefficients) {
                        *uj -= step * rj;
                    }
                }
            }

            for (slot, &(i, bound)) in bounded.iter().enumerate() {
                let grad = bound - u[i];
                let projected = if mu[slot] <= 0.0 { grad.max(0.0) } else { grad };
                max_violation = max_violation.max(projected.abs());
                if projected == 0.0 {
                    continue;
                }

                let new_mu = (mu[slot] + grad * two_lambda).max(0.0);
                let delta = new_mu - mu[slot];
                mu[slot] = new_mu;
                u[i] += delta / two_lambda;
            }

            if !max_violation.is_finite() {
                return Err(SolveFailure::Numerical(format!(
                    "non-finite gradient after {iterations} passes"
                )));
            }
            if max_violation < self.config.epsilon {
                converged = true;
                break;
            }
            if let Some(limit) = self.config.time_limit {
                if started.elapsed() > limit {
                    return Err(SolveFailure::TimedOut);
                }
            }
        }

        if !converged {
            warn!(
                "QP solver reached max iterations ({}) before converging",
                self.config.max_iterations
            );
        }

        // Dual iterates satisfy the bounds only up to tolerance
        for &(i, bound) in &bounded {
            u[i] = u[i].max(bound);
        }

        if u.iter().any(|v| !v.is_finite()) {
            return Err(SolveFailure::Numerical(
                "non-finite primal solution".to_string(),
            ));
        }

        let objective = qp.objective(&u);
        debug!(
            "QP solved: {} rows, {} passes, objective {:.6}",
            qp.rows.len(),
            iterations,
            objective
        );

        Ok(QpSolution {
            x: u,
            objective,
            iterations,
        })
    }
}
