//! Cone subproblem construction
//!
//! Translates the current active sets and a chosen center into the slack-form
//! QP understood by [`QpSolver`], and turns the solver's answer back into a
//! [`Cone`]. Variables are laid out as `u = (w_1, .., w_d, xi, gamma)`.

use crate::core::{Cone, EmptyBPolicy, Sample, SolveFailure};
use crate::solver::{QpSolver, SlackQp};

/// One cone-fitting problem over the current active sets
#[derive(Debug, Clone, Copy)]
pub struct Subproblem<'a> {
    pub samples: &'a [Sample],
    pub active_a: &'a [usize],
    pub active_b: &'a [usize],
    pub center: &'a [f64],
    pub c: f64,
    pub lambda: f64,
    pub empty_b: EmptyBPolicy,
}

impl<'a> Subproblem<'a> {
    /// Feature dimension of the problem
    pub fn dim(&self) -> usize {
        self.center.len()
    }

    /// Build the slack-form QP
    pub fn build(&self) -> Result<SlackQp, SolveFailure> {
        if self.active_a.is_empty() {
            return Err(SolveFailure::EmptyProblem);
        }
        if self.active_b.is_empty() && self.empty_b == EmptyBPolicy::Fail {
            return Err(SolveFailure::EmptyPositiveClass);
        }

        let d = self.dim();
        let xi = d;
        let gamma = d + 1;

        let mut qp = SlackQp::new(d + 2, self.lambda)
            .with_lower_bound(xi, 0.0)
            .with_lower_bound(gamma, 1.0);

        // g(a) + 1 <= y
        let weight_a = 1.0 / self.active_a.len() as f64;
        for &i in self.active_a {
            let mut row = self.offsets(&self.samples[i].features);
            row.push(-1.0);
            qp.push_row(row, weight_a);
        }

        // -g(b) + 1 <= z
        if !self.active_b.is_empty() {
            let weight_b = self.c / self.active_b.len() as f64;
            for &j in self.active_b {
                let mut row: Vec<f64> = self
                    .offsets(&self.samples[j].features)
                    .into_iter()
                    .map(|v| -v)
                    .collect();
                row.push(1.0);
                qp.push_row(row, weight_b);
            }
        }

        Ok(qp)
    }

    /// Solve the subproblem and parse the answer into a cone
    pub fn solve<S: QpSolver + ?Sized>(&self, solver: &S) -> Result<Cone, SolveFailure> {
        let qp = self.build()?;
        let solution = solver.solve(&qp)?;

        let d = self.dim();
        if solution.x.len() != d + 2 {
            return Err(SolveFailure::Numerical(format!(
                "solver returned {} values, expected {}",
                solution.x.len(),
                d + 2
            )));
        }
        if solution.x.iter().any(|v| !v.is_finite()) || !solution.objective.is_finite() {
            return Err(SolveFailure::Numerical(
                "solver returned non-finite values".to_string(),
            ));
        }

        Ok(Cone {
            center: self.center.to_vec(),
            w: solution.x[..d].to_vec(),
            xi: solution.x[d].max(0.0),
            gamma: solution.x[d + 1].max(1.0),
            objective: solution.objective,
        })
    }

    /// `(x - c, ||x - c||_1)` for one point
    fn offsets(&self, x: &[f64]) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.dim() + 2);
        let mut l1 = 0.0;
        for (&xv, &cv) in x.iter().zip(self.center) {
            let diff = xv - cv;
            l1 += diff.abs();
            row.push(diff);
        }
        row.push(l1);
        row
    }
}
