//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2
//! -1 2:0.3 5:2.1
//!
//! Rows are expanded to dense vectors whose dimension is the largest index in
//! the file, or the dimension requested by the caller if that is larger;
//! absent entries are zero.

use super::LoadOptions;
use crate::core::{Dataset, RPCFError, Result, Sample};
use crate::utils::labels::LabelMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Largest accepted feature index
pub const MAX_FEATURE_INDEX: usize = 1 << 20;

/// Largest number of dense values a file may expand to
pub const MAX_DENSE_VALUES: usize = 1 << 27;

/// Dataset implementation for LibSVM format files
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    samples: Vec<Sample>,
    dimensions: usize,
    label_map: LabelMap,
}

type SparseRow = (Vec<(usize, f64)>, f64);

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_options(path, LoadOptions::default())
    }

    /// Load a file whose rows must have at least `min_dim` features
    pub fn from_file_with_dim<P: AsRef<Path>>(path: P, min_dim: usize) -> Result<Self> {
        Self::from_file_with_options(path, LoadOptions::default().with_min_dim(min_dim))
    }

    /// Load a file with explicit dimension and label options
    pub fn from_file_with_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let file = File::open(path).map_err(RPCFError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader_with_options(reader, options)
    }

    /// Load a dataset from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, LoadOptions::default())
    }

    /// Load a dataset, padding rows to at least `min_dim` features
    ///
    /// Useful for test files whose trailing features happen to be all zero.
    pub fn from_reader_with_dim<R: BufRead>(reader: R, min_dim: Option<usize>) -> Result<Self> {
        Self::from_reader_with_options(
            reader,
            LoadOptions {
                min_dim,
                ..LoadOptions::default()
            },
        )
    }

    /// Load a dataset from a reader with explicit options
    pub fn from_reader_with_options<R: BufRead>(reader: R, options: LoadOptions) -> Result<Self> {
        let mut rows: Vec<SparseRow> = Vec::new();
        let mut max_dimension = options.min_dim.unwrap_or(0);

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(RPCFError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::parse_line(line) {
                Ok((entries, label)) => {
                    if let Some(&(idx, _)) = entries.iter().max_by_key(|(idx, _)| *idx) {
                        max_dimension = max_dimension.max(idx + 1);
                    }
                    rows.push((entries, label));
                }
                Err(e) => {
                    return Err(RPCFError::ParseError(format!(
                        "Error parsing line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }

        if rows.is_empty() {
            return Err(RPCFError::EmptyDataset);
        }

        match rows.len().checked_mul(max_dimension) {
            Some(total) if total <= MAX_DENSE_VALUES => {}
            _ => {
                return Err(RPCFError::ParseError(format!(
                    "{} rows of dimension {} exceed the dense size limit of {} values",
                    rows.len(),
                    max_dimension,
                    MAX_DENSE_VALUES
                )))
            }
        }

        let mut labels: Vec<f64> = rows.iter().map(|(_, label)| *label).collect();
        let label_map = options.map_labels(&mut labels);

        let samples = rows
            .into_iter()
            .zip(labels)
            .map(|((entries, _), label)| {
                let mut features = vec![0.0; max_dimension];
                for (idx, value) in entries {
                    features[idx] = value;
                }
                Sample::new(features, label)
            })
            .collect();

        Ok(LibSVMDataset {
            samples,
            dimensions: max_dimension,
            label_map,
        })
    }

    /// Label mapping applied while loading
    pub fn label_map(&self) -> LabelMap {
        self.label_map
    }

    /// Parse a single line into zero-based (index, value) pairs and a raw label
    fn parse_line(line: &str) -> Result<SparseRow> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.is_empty() {
            return Err(RPCFError::ParseError("Empty line".to_string()));
        }

        let label = parts[0]
            .parse::<f64>()
            .map_err(|_| RPCFError::ParseError(format!("Invalid label: {}", parts[0])))?;

        let mut entries = Vec::with_capacity(parts.len() - 1);
        for feature_str in &parts[1..] {
            let (index, value) = feature_str.split_once(':').ok_or_else(|| {
                RPCFError::ParseError(format!("Invalid feature format: {}", feature_str))
            })?;

            let index = index.parse::<usize>().map_err(|_| {
                RPCFError::ParseError(format!("Invalid feature index: {}", index))
            })?;

            let value = value.parse::<f64>().map_err(|_| {
                RPCFError::ParseError(format!("Invalid feature value: {}", value))
            })?;

            // libsvm uses 1-based indexing, convert to 0-based
            if index == 0 {
                return Err(RPCFError::ParseError(
                    "Feature index must be positive: 0".to_string(),
                ));
            }
            if index > MAX_FEATURE_INDEX {
                return Err(RPCFError::ParseError(format!(
                    "Feature index {} exceeds the limit of {}",
                    index, MAX_FEATURE_INDEX
                )));
            }
            entries.push((index - 1, value));
        }

        Ok((entries, label))
    }
}

impl Dataset for LibSVMDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}
