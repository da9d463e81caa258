//! Model serialization and persistence
//!
//! This module provides functionality to save and load trained cone models
//! for use with the CLI application and other scenarios where model persistence is needed.

use crate::api::{TrainedModel, TrainingParams};
use crate::core::{Cone, RPCFError, Result};
use crate::model::ConeModel;
use crate::selector::SelectionStrategy;
use crate::utils::labels::LabelMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained cone model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Cones in construction order
    pub cones: Vec<ConeRecord>,
    /// Feature dimension (0 for a model without cones)
    pub dimension: usize,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable cone representation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConeRecord {
    pub center: Vec<f64>,
    pub w: Vec<f64>,
    pub xi: f64,
    pub gamma: f64,
    pub objective: f64,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    pub n_cones: usize,
    /// Training parameters used
    pub training_params: TrainingParamsRecord,
    /// Mapping from raw file labels to {-1, +1}
    #[serde(default)]
    pub label_map: LabelMap,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingParamsRecord {
    pub c: f64,
    pub lambda: f64,
    pub strategy: SelectionStrategy,
}

impl From<&Cone> for ConeRecord {
    fn from(cone: &Cone) -> Self {
        Self {
            center: cone.center.clone(),
            w: cone.w.clone(),
            xi: cone.xi,
            gamma: cone.gamma,
            objective: cone.objective,
        }
    }
}

impl TryFrom<&ConeRecord> for Cone {
    type Error = RPCFError;

    fn try_from(record: &ConeRecord) -> Result<Self> {
        if record.w.len() != record.center.len() {
            return Err(RPCFError::DimensionMismatch {
                expected: record.center.len(),
                actual: record.w.len(),
            });
        }
        if !(record.xi >= 0.0) || !(record.gamma >= 1.0) {
            return Err(RPCFError::SerializationError(format!(
                "Invalid cone parameters: xi = {}, gamma = {}",
                record.xi, record.gamma
            )));
        }

        Ok(Cone {
            center: record.center.clone(),
            w: record.w.clone(),
            xi: record.xi,
            gamma: record.gamma,
            objective: record.objective,
        })
    }
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel) -> Self {
        let inner = model.inner();
        let params = model.params();

        Self {
            cones: inner.cones().iter().map(ConeRecord::from).collect(),
            dimension: inner.dim().unwrap_or(0),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_cones: inner.len(),
                training_params: TrainingParamsRecord {
                    c: params.c,
                    lambda: params.lambda,
                    strategy: params.strategy.clone(),
                },
                label_map: model.label_map(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(RPCFError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| RPCFError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(RPCFError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| RPCFError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Rebuild the cone model, checking every cone against the stored dimension
    pub fn to_model(&self) -> Result<ConeModel> {
        let cones = self
            .cones
            .iter()
            .map(Cone::try_from)
            .collect::<Result<Vec<Cone>>>()?;

        if let Some(cone) = cones.iter().find(|c| c.dim() != self.dimension) {
            return Err(RPCFError::DimensionMismatch {
                expected: self.dimension,
                actual: cone.dim(),
            });
        }

        ConeModel::from_cones(cones)
    }

    /// Convert back to a trained model
    pub fn to_trained_model(&self) -> Result<TrainedModel> {
        let params = &self.metadata.training_params;
        Ok(TrainedModel::from_parts(
            self.to_model()?,
            TrainingParams {
                c: params.c,
                lambda: params.lambda,
                strategy: params.strategy.clone(),
            },
        )
        .with_label_map(self.metadata.label_map))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== RPCF Model Summary ===");
        println!("Cones: {}", self.metadata.n_cones);
        println!("Dimension: {}", self.dimension);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Label Mapping: {:?}", self.metadata.label_map);
        println!("Training Parameters:");
        println!("  C: {}", self.metadata.training_params.c);
        println!("  Lambda: {}", self.metadata.training_params.lambda);
        println!(
            "  Selection: {}",
            self.metadata.training_params.strategy.name()
        );
    }

    /// Print the ordered cone list
    pub fn print_cones(&self) {
        for (k, cone) in self.cones.iter().enumerate() {
            println!("--- Cone {} ---", k + 1);
            println!("  center: {:?}", cone.center);
            println!("  w: {:?}", cone.w);
            println!("  xi: {:.6}", cone.xi);
            println!("  gamma: {:.6}", cone.gamma);
            println!("  objective: {:.6}", cone.objective);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RPCF;
    use crate::core::{Sample, VnsConfig};
    use tempfile::NamedTempFile;

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new(vec![0.0, 0.0], -1.0),
            Sample::new(vec![0.3, -0.2], -1.0),
            Sample::new(vec![4.0, 4.0], 1.0),
            Sample::new(vec![-4.0, 3.0], 1.0),
        ]
    }

    #[test]
    fn test_cone_record_conversion() {
        let cone = Cone {
            center: vec![1.0, 2.0],
            w: vec![0.5, -0.5],
            xi: 0.25,
            gamma: 1.5,
            objective: 0.1,
        };

        let record = ConeRecord::from(&cone);
        let converted_back = Cone::try_from(&record).unwrap();
        assert_eq!(converted_back, cone);
    }

    #[test]
    fn test_invalid_record_rejected() {
        let record = ConeRecord {
            center: vec![0.0],
            w: vec![0.0],
            xi: 0.0,
            gamma: 0.5,
            objective: 0.0,
        };
        assert!(Cone::try_from(&record).is_err());

        let ragged = ConeRecord {
            center: vec![0.0, 1.0],
            w: vec![0.0],
            xi: 0.0,
            gamma: 1.0,
            objective: 0.0,
        };
        assert!(matches!(
            Cone::try_from(&ragged),
            Err(RPCFError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_model_serialization() -> Result<()> {
        let data = samples();
        let model = RPCF::new()
            .with_seed(9)
            .with_vns(VnsConfig::default())
            .train_samples(&data)?;
        let serializable = SerializableModel::from_trained_model(&model);

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        serializable.save_to_file(temp_file.path())?;

        let loaded = SerializableModel::load_from_file(temp_file.path())?;
        assert_eq!(loaded.cones, serializable.cones);
        assert_eq!(loaded.dimension, 2);
        assert_eq!(loaded.metadata.n_cones, model.n_cones());

        let restored = loaded.to_trained_model()?;
        assert_eq!(restored.params(), model.params());
        for sample in &data {
            assert_eq!(
                restored.predict(sample).label,
                model.predict(sample).label
            );
        }

        Ok(())
    }

    #[test]
    fn test_empty_model_round_trip() -> Result<()> {
        let empty = TrainedModel::from_parts(
            ConeModel::new(),
            TrainingParams {
                c: 1.0,
                lambda: 0.01,
                strategy: SelectionStrategy::Random,
            },
        );
        let serializable = SerializableModel::from_trained_model(&empty);
        assert_eq!(serializable.dimension, 0);

        let restored = serializable.to_trained_model()?;
        assert_eq!(restored.n_cones(), 0);
        assert_eq!(restored.predict(&Sample::new(vec![1.0], 1.0)).label, 0.0);
        Ok(())
    }

    #[test]
    fn test_label_map_survives_save_and_load() -> Result<()> {
        let model = RPCF::new()
            .with_seed(2)
            .train_samples(&samples())?
            .with_label_map(LabelMap::Negative(3.0));

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        SerializableModel::from_trained_model(&model).save_to_file(temp_file.path())?;
        let restored = SerializableModel::load_from_file(temp_file.path())?.to_trained_model()?;

        assert_eq!(restored.label_map(), LabelMap::Negative(3.0));
        assert_eq!(restored.load_options().min_dim, Some(2));
        Ok(())
    }

    #[test]
    fn test_model_without_label_map_loads_as_signed() -> Result<()> {
        let json = r#"{
            "cones": [],
            "dimension": 0,
            "metadata": {
                "library_version": "0.1.0",
                "n_cones": 0,
                "training_params": {"c": 1.0, "lambda": 0.01, "strategy": "Random"},
                "created_at": "2024-01-01T00:00:00+00:00"
            }
        }"#;
        let model: SerializableModel =
            serde_json::from_str(json).map_err(|e| RPCFError::SerializationError(e.to_string()))?;
        assert_eq!(model.metadata.label_map, LabelMap::Signed);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = SerializableModel::load_from_file("/non/existent/model.json");
        assert!(matches!(result, Err(RPCFError::IoError(_))));
    }
}
