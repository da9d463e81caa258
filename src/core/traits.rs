//! Core traits for PCF classification

use crate::core::{Prediction, Sample};

/// Dataset abstraction for efficient data access
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// Get multiple samples
    fn get_batch(&self, indices: &[usize]) -> Vec<Sample> {
        indices.iter().map(|&i| self.get_sample(i)).collect()
    }

    /// Get all samples
    fn samples(&self) -> Vec<Sample> {
        (0..self.len()).map(|i| self.get_sample(i)).collect()
    }

    /// Get all labels as a vector
    fn get_labels(&self) -> Vec<f64>;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trained classifier
pub trait Classifier: Send + Sync {
    /// Predict a single feature vector
    fn predict(&self, features: &[f64]) -> Prediction;

    /// Predict multiple samples
    fn predict_batch(&self, samples: &[Sample]) -> Vec<Prediction> {
        samples.iter().map(|s| self.predict(&s.features)).collect()
    }

    /// Number of cones in the model
    fn n_cones(&self) -> usize;
}

/// In-memory dataset over owned samples
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl InMemoryDataset {
    /// Wrap samples; the dimension is taken from the first sample
    pub fn new(samples: Vec<Sample>) -> Self {
        let dimensions = samples.first().map(|s| s.dim()).unwrap_or(0);
        Self {
            samples,
            dimensions,
        }
    }

    /// Build from a feature matrix and label vector
    pub fn from_rows(rows: Vec<Vec<f64>>, labels: &[f64]) -> Self {
        let samples = rows
            .into_iter()
            .zip(labels.iter())
            .map(|(features, &label)| Sample::new(features, label))
            .collect();
        Self::new(samples)
    }

    /// Borrow the underlying samples
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}

impl Dataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn samples(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}
