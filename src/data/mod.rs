//! Data loading and dataset implementations
//!
//! This module provides implementations of the Dataset trait for the CSV and
//! LibSVM text formats.

pub mod csv;
pub mod libsvm;

pub use self::csv::*;
pub use self::libsvm::*;

use crate::utils::labels::{normalize_labels, LabelMap};

/// Options for reading a file against an already trained model
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadOptions {
    /// Pad sparse rows to at least this many features (LibSVM only)
    pub min_dim: Option<usize>,
    /// Label mapping to apply; resolved from the file itself when absent
    pub label_map: Option<LabelMap>,
}

impl LoadOptions {
    pub fn with_min_dim(mut self, dim: usize) -> Self {
        self.min_dim = Some(dim);
        self
    }

    pub fn with_label_map(mut self, map: LabelMap) -> Self {
        self.label_map = Some(map);
        self
    }

    /// Map raw labels, returning the mapping that was used
    pub(crate) fn map_labels(&self, labels: &mut [f64]) -> LabelMap {
        match self.label_map {
            Some(map) => {
                map.apply_all(labels);
                map
            }
            None => normalize_labels(labels),
        }
    }
}
