//! High-level API for PCF classification
//!
//! This module provides a user-friendly interface for common tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rpcf::api::RPCF;
//! use rpcf::VnsConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model with VNS center selection
//! let model = RPCF::new()
//!     .with_c(10.0)
//!     .with_lambda(0.01)
//!     .with_vns(VnsConfig::default())
//!     .train_from_file("data.libsvm")?;
//!
//! println!("Cones: {}", model.n_cones());
//! println!("Accuracy: {:.2}%", model.evaluate_from_file("test.libsvm")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Classifier, Dataset, EmptyBPolicy, Prediction, Result, Sample, SolverConfig, TrainingConfig,
    VnsConfig,
};
use crate::data::{CSVDataset, LibSVMDataset, LoadOptions};
use crate::model::ConeModel;
use crate::selector::SelectionStrategy;
use crate::solver::DualCoordinateDescent;
use crate::trainer::{ConeTrainer, FitReport};
use crate::utils::labels::LabelMap;
use std::path::Path;

/// High-level classifier interface with builder pattern
#[derive(Debug, Clone, Default)]
pub struct RPCF {
    config: TrainingConfig,
    strategy: SelectionStrategy,
    solver_config: SolverConfig,
}

impl RPCF {
    /// Create a new classifier with random center selection and default
    /// parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the positive-class penalty C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the regularization weight lambda
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.lambda = lambda;
        self
    }

    /// Set the RNG seed for reproducible center selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the empty positive class policy
    pub fn with_empty_b_policy(mut self, policy: EmptyBPolicy) -> Self {
        self.config.empty_b = policy;
        self
    }

    /// Set the center selection strategy
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use variable neighborhood search for center selection
    pub fn with_vns(self, config: VnsConfig) -> Self {
        self.with_strategy(SelectionStrategy::Vns(config))
    }

    /// Set the QP solver configuration
    pub fn with_solver_config(mut self, solver_config: SolverConfig) -> Self {
        self.solver_config = solver_config;
        self
    }

    fn trainer(&self) -> ConeTrainer<DualCoordinateDescent> {
        ConeTrainer::new(
            DualCoordinateDescent::new(self.solver_config.clone()),
            self.config.clone(),
            self.strategy.clone(),
        )
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(&self, dataset: &D) -> Result<TrainedModel> {
        let outcome = self.trainer().fit(dataset)?;
        Ok(TrainedModel {
            model: outcome.model,
            report: Some(outcome.report),
            params: self.params(),
            label_map: LabelMap::Signed,
        })
    }

    /// Train on samples
    pub fn train_samples(&self, samples: &[Sample]) -> Result<TrainedModel> {
        let outcome = self.trainer().fit_samples(samples)?;
        Ok(TrainedModel {
            model: outcome.model,
            report: Some(outcome.report),
            params: self.params(),
            label_map: LabelMap::Signed,
        })
    }

    /// Train from LibSVM format file
    ///
    /// The file's label mapping is kept with the model and reused when later
    /// files are loaded through it.
    pub fn train_from_file<P: AsRef<Path>>(&self, path: P) -> Result<TrainedModel> {
        let dataset = LibSVMDataset::from_file(path)?;
        Ok(self.train(&dataset)?.with_label_map(dataset.label_map()))
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<TrainedModel> {
        let dataset = CSVDataset::from_file(path)?;
        Ok(self.train(&dataset)?.with_label_map(dataset.label_map()))
    }

    fn params(&self) -> TrainingParams {
        TrainingParams {
            c: self.config.c,
            lambda: self.config.lambda,
            strategy: self.strategy.clone(),
        }
    }
}

/// Hyperparameters a model was trained with
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
    pub c: f64,
    pub lambda: f64,
    pub strategy: SelectionStrategy,
}

/// Trained cone model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: ConeModel,
    report: Option<FitReport>,
    params: TrainingParams,
    label_map: LabelMap,
}

impl TrainedModel {
    /// Wrap an existing cone model, e.g. one loaded from disk
    pub fn from_parts(model: ConeModel, params: TrainingParams) -> Self {
        Self {
            model,
            report: None,
            params,
            label_map: LabelMap::Signed,
        }
    }

    /// Set the mapping from raw file labels to {-1, +1}
    pub fn with_label_map(mut self, label_map: LabelMap) -> Self {
        self.label_map = label_map;
        self
    }

    /// Mapping from raw file labels to {-1, +1} used at training time
    pub fn label_map(&self) -> LabelMap {
        self.label_map
    }

    /// Options for loading files against this model: rows padded to the
    /// model dimension and labels mapped the way the training data was
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            min_dim: self.model.dim(),
            label_map: Some(self.label_map),
        }
    }

    /// Predict a single sample
    pub fn predict(&self, sample: &Sample) -> Prediction {
        self.model.predict(&sample.features)
    }

    /// Predict multiple samples
    pub fn predict_batch(&self, samples: &[Sample]) -> Vec<Prediction> {
        self.model.predict_batch(samples)
    }

    /// Predict from dataset, checking dimensions
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<Prediction>> {
        (0..dataset.len())
            .map(|i| self.model.try_predict(&dataset.get_sample(i).features))
            .collect()
    }

    /// Predict from LibSVM file
    pub fn predict_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = LibSVMDataset::from_file_with_options(path, self.load_options())?;
        self.predict_dataset(&dataset)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = CSVDataset::from_file_with_options(path, self.load_options())?;
        self.predict_dataset(&dataset)
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        Ok(self.evaluate_detailed(dataset)?.accuracy())
    }

    /// Evaluate accuracy from LibSVM file
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = LibSVMDataset::from_file_with_options(path, self.load_options())?;
        self.evaluate(&dataset)
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file_with_options(path, self.load_options())?;
        self.evaluate(&dataset)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let predicted: Vec<f64> = self
            .predict_dataset(dataset)?
            .iter()
            .map(|p| p.label)
            .collect();
        Ok(EvaluationMetrics::from_labels(&predicted, &dataset.get_labels()))
    }

    /// Number of cones
    pub fn n_cones(&self) -> usize {
        self.model.len()
    }

    /// Hyperparameters used for training
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Construction report, absent for models loaded from disk
    pub fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    /// Get the underlying cone model
    pub fn inner(&self) -> &ConeModel {
        &self.model
    }
}

/// Detailed evaluation metrics
///
/// The positive class is +1. Predictions of an untrained model (label 0)
/// count as wrong for both classes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Predictions that were neither +1 nor -1
    pub undecided: usize,
}

impl EvaluationMetrics {
    /// Tally predicted against actual labels
    pub fn from_labels(predicted: &[f64], actual: &[f64]) -> Self {
        let mut metrics = Self {
            true_positives: 0,
            true_negatives: 0,
            false_positives: 0,
            false_negatives: 0,
            undecided: 0,
        };

        for (&pred, &truth) in predicted.iter().zip(actual) {
            match (pred, truth > 0.0) {
                (p, true) if p > 0.0 => metrics.true_positives += 1,
                (p, false) if p < 0.0 => metrics.true_negatives += 1,
                (p, false) if p > 0.0 => metrics.false_positives += 1,
                (p, true) if p < 0.0 => metrics.false_negatives += 1,
                _ => metrics.undecided += 1,
            }
        }

        metrics
    }

    fn total(&self) -> usize {
        self.true_positives
            + self.true_negatives
            + self.false_positives
            + self.false_negatives
            + self.undecided
    }

    /// Calculate accuracy: (TP + TN) / total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
