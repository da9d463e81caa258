//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)
//!
//! Labels are normalised to {-1, +1} once the whole file is read, either with
//! a mapping resolved from the file or with one supplied by the caller.

use super::LoadOptions;
use crate::core::{Dataset, RPCFError, Result, Sample};
use crate::utils::labels::LabelMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    samples: Vec<Sample>,
    dimensions: usize,
    label_map: LabelMap,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_options(path, LoadOptions::default())
    }

    /// Load a CSV file with an explicit label mapping
    ///
    /// `options.min_dim` is ignored: CSV rows are dense already.
    pub fn from_file_with_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let file = File::open(path).map_err(RPCFError::IoError)?;
        let reader = BufReader::new(file);
        Self::load(reader, true, options)
    }

    /// Load a dataset from a reader with header auto-detection
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::load(reader, true, LoadOptions::default())
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_header_detection<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        Self::load(reader, auto_detect_header, LoadOptions::default())
    }

    /// Load a dataset from a reader with explicit options
    pub fn from_reader_with_options<R: BufRead>(reader: R, options: LoadOptions) -> Result<Self> {
        Self::load(reader, true, options)
    }

    fn load<R: BufRead>(reader: R, auto_detect_header: bool, options: LoadOptions) -> Result<Self> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut labels: Vec<f64> = Vec::new();
        let mut first_data_line = true;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(RPCFError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let (features, label) = Self::parse_data_line(line).map_err(|e| {
                RPCFError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;

            if let Some(first) = rows.first() {
                if first.len() != features.len() {
                    return Err(RPCFError::DimensionMismatch {
                        expected: first.len(),
                        actual: features.len(),
                    });
                }
            }

            rows.push(features);
            labels.push(label);
        }

        if rows.is_empty() {
            return Err(RPCFError::EmptyDataset);
        }

        let label_map = options.map_labels(&mut labels);
        let dimensions = rows[0].len();
        let samples = rows
            .into_iter()
            .zip(labels)
            .map(|(features, label)| Sample::new(features, label))
            .collect();

        Ok(CSVDataset {
            samples,
            dimensions,
            label_map,
        })
    }

    /// Label mapping applied while loading
    pub fn label_map(&self) -> LabelMap {
        self.label_map
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most non-label fields failing to parse means a header
        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    /// Parse a CSV data line into features and a raw label
    fn parse_data_line(line: &str) -> Result<(Vec<f64>, f64)> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(RPCFError::ParseError(format!(
                "Line has too few fields: {}",
                line
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = label_str
            .parse::<f64>()
            .map_err(|_| RPCFError::ParseError(format!("Invalid label: {}", label_str)))?;

        let features = fields[..fields.len() - 1]
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    RPCFError::ParseError(format!(
                        "Invalid feature value at column {}: {}",
                        idx + 1,
                        field
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok((features, label))
    }
}

impl Dataset for CSVDataset {
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
