//! Utility functions for dataset preparation

use crate::core::{RPCFError, Result, Sample};

/// Label normalisation utilities
pub mod labels {
    use serde::{Deserialize, Serialize};

    /// How raw file labels map onto {-1, +1}
    ///
    /// Resolved once on the training data and then applied unchanged to every
    /// later file, so a test file holding a single class keeps the meaning it
    /// had during training.
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub enum LabelMap {
        /// Labels are already -1 / +1
        #[default]
        Signed,
        /// 0 is the negative class, 1 the positive one
        ZeroOne,
        /// Labels up to this raw value are negative, the rest positive
        Negative(f64),
    }

    impl LabelMap {
        /// Pick the mapping for a set of raw training labels
        ///
        /// {0, 1} becomes {-1, +1}; labels already in {-1, +1} are kept; any
        /// other labelling sends the smallest label to -1 and everything else
        /// to +1.
        pub fn resolve(labels: &[f64]) -> Self {
            if labels.iter().all(|&y| y == -1.0 || y == 1.0) {
                return LabelMap::Signed;
            }
            if labels.iter().all(|&y| y == 0.0 || y == 1.0) {
                return LabelMap::ZeroOne;
            }
            let min = labels.iter().copied().fold(f64::INFINITY, f64::min);
            LabelMap::Negative(min)
        }

        /// Map one raw label
        pub fn apply(&self, label: f64) -> f64 {
            let negative = match *self {
                LabelMap::Signed | LabelMap::ZeroOne => label <= 0.0,
                LabelMap::Negative(threshold) => label <= threshold,
            };
            if negative {
                -1.0
            } else {
                1.0
            }
        }

        /// Map raw labels in place
        pub fn apply_all(&self, labels: &mut [f64]) {
            for y in labels.iter_mut() {
                *y = self.apply(*y);
            }
        }
    }

    /// Map arbitrary binary labels onto {-1, +1}, returning the mapping used
    pub fn normalize_labels(labels: &mut [f64]) -> LabelMap {
        let map = LabelMap::resolve(labels);
        map.apply_all(labels);
        map
    }

    /// Count (negative, positive) labels
    pub fn class_counts(labels: &[f64]) -> (usize, usize) {
        let negative = labels.iter().filter(|&&y| y < 0.0).count();
        (negative, labels.len() - negative)
    }
}

/// Train/validation splitting
pub mod split {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Default share of samples held out for validation
    pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.2;

    /// Seeded stratified split into (train, validation)
    ///
    /// Each class contributes `round(n_class * fraction)` samples to the
    /// validation set. When a class has fewer than two samples the split falls
    /// back to a plain shuffle of the whole set. Both parts are always
    /// non-empty.
    pub fn train_validation_split(
        samples: &[Sample],
        validation_fraction: f64,
        seed: u64,
    ) -> Result<(Vec<Sample>, Vec<Sample>)> {
        if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
            return Err(RPCFError::InvalidParameter(format!(
                "Validation fraction must be in (0, 1), got {}",
                validation_fraction
            )));
        }
        if samples.len() < 2 {
            return Err(RPCFError::InvalidDataset(
                "At least two samples are needed for a train/validation split".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let mut negatives: Vec<usize> = Vec::new();
        let mut positives: Vec<usize> = Vec::new();
        for (i, sample) in samples.iter().enumerate() {
            if sample.label < 0.0 {
                negatives.push(i);
            } else {
                positives.push(i);
            }
        }

        let mut train = Vec::new();
        let mut validation = Vec::new();

        if negatives.len() >= 2 && positives.len() >= 2 {
            for mut class in [negatives, positives] {
                class.shuffle(&mut rng);
                let n_val = held_out(class.len(), validation_fraction);
                let (val_idx, train_idx) = class.split_at(n_val);
                validation.extend(val_idx.iter().map(|&i| samples[i].clone()));
                train.extend(train_idx.iter().map(|&i| samples[i].clone()));
            }
        } else {
            log::debug!("Class too small for stratification, using a plain shuffled split");
            let mut all: Vec<usize> = (0..samples.len()).collect();
            all.shuffle(&mut rng);
            let n_val = held_out(all.len(), validation_fraction);
            let (val_idx, train_idx) = all.split_at(n_val);
            validation.extend(val_idx.iter().map(|&i| samples[i].clone()));
            train.extend(train_idx.iter().map(|&i| samples[i].clone()));
        }

        Ok((train, validation))
    }

    /// Number of held-out items, kept within [1, n - 1]
    fn held_out(n: usize, fraction: f64) -> usize {
        let n_val = (n as f64 * fraction).round() as usize;
        n_val.clamp(1, n - 1)
    }
}
