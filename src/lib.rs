//! Rust implementation of the Revised Polyhedral Conic Function (r-PCF) classifier
//!
//! A binary classifier built as a union of polyhedral conic regions around the
//! negative class, grown one cone at a time by an incremental
//! cut-and-remove loop with random or variable neighborhood search center
//! selection.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod grid_search;
pub mod knn;
pub mod model;
pub mod persistence;
pub mod selector;
pub mod solver;
pub mod subproblem;
pub mod trainer;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, TrainedModel, TrainingParams, RPCF};
pub use crate::cache::{CacheStats, ScoreCache};
pub use crate::core::error::{RPCFError, Result, SolveFailure};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{CSVDataset, LibSVMDataset, LoadOptions};
pub use crate::grid_search::{GridPoint, GridSearch, GridSearchResult};
pub use crate::model::ConeModel;
pub use crate::selector::{CenterSelector, RandomSelector, SelectionStrategy, VnsSelector};
pub use crate::solver::{DualCoordinateDescent, QpSolution, QpSolver, SlackQp};
pub use crate::trainer::{ConeTrainer, FitOutcome, FitReport, Termination};
pub use crate::utils::labels::LabelMap;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
