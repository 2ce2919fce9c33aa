//! Error types for the roi_forecast crate

use thiserror::Error;

/// Custom error types for the roi_forecast crate
#[derive(Debug, Error)]
pub enum RoiError {
    /// Ad approach label that was not seen when the encoder was fitted
    #[error("Unknown category: '{0}' was not present in the training data")]
    UnknownCategory(String),

    /// Required input field absent from a campaign record
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Feature arity differs between training and inference
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Training set too small to split or fit
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Persisted model does not match the compiled feature schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from the math kernels
    #[error("Math error: {0}")]
    MathError(#[from] roi_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, RoiError>;
