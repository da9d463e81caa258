//! Cone ensemble storage and prediction

use crate::core::{Classifier, Cone, Prediction, RPCFError, Result};

/// Ordered, append-only collection of fitted cones
///
/// A point is assigned to the negative class when it falls inside at least
/// one cone, i.e. `min_k g_k(x) <= 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConeModel {
    cones: Vec<Cone>,
}

impl ConeModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a model from cones in creation order
    pub fn from_cones(cones: Vec<Cone>) -> Result<Self> {
        if let Some(first) = cones.first() {
            let dim = first.dim();
            for cone in &cones {
                if cone.dim() != dim || cone.w.len() != dim {
                    return Err(RPCFError::DimensionMismatch {
                        expected: dim,
                        actual: cone.w.len().max(cone.dim()),
                    });
                }
            }
        }
        Ok(Self { cones })
    }

    pub(crate) fn push(&mut self, cone: Cone) {
        self.cones.push(cone);
    }

    /// Fitted cones in creation order
    pub fn cones(&self) -> &[Cone] {
        &self.cones
    }

    /// Number of cones
    pub fn len(&self) -> usize {
        self.cones.len()
    }

    /// Whether the model holds no cones
    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    /// Feature dimension, unknown for an empty model
    pub fn dim(&self) -> Option<usize> {
        self.cones.first().map(Cone::dim)
    }

    /// Minimum conic function value over all cones
    ///
    /// Returns `+inf` for an empty model.
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.cones
            .iter()
            .map(|cone| cone.evaluate(x))
            .fold(f64::INFINITY, f64::min)
    }

    /// Predict after checking the input dimension
    pub fn try_predict(&self, x: &[f64]) -> Result<Prediction> {
        if let Some(dim) = self.dim() {
            if x.len() != dim {
                return Err(RPCFError::DimensionMismatch {
                    expected: dim,
                    actual: x.len(),
                });
            }
        }
        Ok(self.predict(x))
    }

    /// Predict labels for rows of a feature matrix
    pub fn predict_labels(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter()
            .map(|x| self.try_predict(x).map(|p| p.label))
            .collect()
    }
}

impl Classifier for ConeModel {
    fn predict(&self, x: &[f64]) -> Prediction {
        if self.cones.is_empty() {
            return Prediction::untrained();
        }
        let value = self.decision_function(x);
        let label = if value <= 0.0 { -1.0 } else { 1.0 };
        Prediction::new(label, value)
    }

    fn n_cones(&self) -> usize {
        self.cones.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UNTRAINED_LABEL;

    fn cone(center: Vec<f64>, gamma: f64) -> Cone {
        let d = center.len();
        Cone {
            center,
            w: vec![0.0; d],
            xi: 1.0,
            gamma,
            objective: 0.0,
        }
    }

    #[test]
    fn test_empty_model_predicts_sentinel() {
        let model = ConeModel::new();
        for x in [[0.0, 0.0], [10.0, -3.0], [1e9, 1e-9]] {
            assert_eq!(model.predict(&x).label, UNTRAINED_LABEL);
        }
        assert_eq!(model.n_cones(), 0);
        assert_eq!(model.dim(), None);
    }

    #[test]
    fn test_union_of_cones() {
        // Two L1 balls of radius 1 around (0,0) and (10,0)
        let model =
            ConeModel::from_cones(vec![cone(vec![0.0, 0.0], 1.0), cone(vec![10.0, 0.0], 1.0)])
                .expect("Valid cones");

        assert_eq!(model.predict(&[0.5, 0.5]).label, -1.0);
        assert_eq!(model.predict(&[10.0, 1.0]).label, -1.0);
        assert_eq!(model.predict(&[5.0, 0.0]).label, 1.0);
        assert_eq!(model.decision_function(&[5.0, 0.0]), 4.0);
    }

    #[test]
    fn test_prediction_is_order_independent() {
        let a = cone(vec![0.0, 0.0], 1.0);
        let b = cone(vec![3.0, 3.0], 2.0);
        let forward = ConeModel::from_cones(vec![a.clone(), b.clone()]).expect("Valid");
        let backward = ConeModel::from_cones(vec![b, a]).expect("Valid");

        for x in [[0.0, 0.0], [2.0, 2.0], [1.5, 1.5], [-4.0, 7.0]] {
            assert_eq!(forward.predict(&x), backward.predict(&x));
        }
    }

    #[test]
    fn test_prediction_is_repeatable() {
        let model = ConeModel::from_cones(vec![cone(vec![1.0], 1.0)]).expect("Valid");
        let first = model.predict(&[1.7]);
        for _ in 0..10 {
            assert_eq!(model.predict(&[1.7]), first);
        }
    }

    #[test]
    fn test_dimension_checks() {
        let result = ConeModel::from_cones(vec![cone(vec![0.0], 1.0), cone(vec![0.0, 0.0], 1.0)]);
        assert!(matches!(result, Err(RPCFError::DimensionMismatch { .. })));

        let model = ConeModel::from_cones(vec![cone(vec![0.0, 0.0], 1.0)]).expect("Valid");
        assert!(model.try_predict(&[0.0]).is_err());
        assert!(model.predict_labels(&[vec![0.0, 0.0]]).is_ok());
    }
}
