//! Error types for the PCF classifier

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RPCFError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Solver failed: {0}")]
    SolverFailed(#[from] SolveFailure),
}

pub type Result<T> = std::result::Result<T, RPCFError>;

/// Reasons a QP solve produced no solution
///
/// These are recoverable outcomes interpreted by whoever requested the solve,
/// not crate errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveFailure {
    #[error("subproblem has no negative-class rows")]
    EmptyProblem,

    #[error("positive class is empty and the strict empty-B policy is active")]
    EmptyPositiveClass,

    #[error("problem is infeasible: {0}")]
    Infeasible(String),

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("solve exceeded its time limit")]
    TimedOut,
}
