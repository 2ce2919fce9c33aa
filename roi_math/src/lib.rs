//! # ROI Math
//!
//! Mathematical calculations used by the revenue model and the advisory layer.
//! This crate provides the impurity statistics that drive regression-tree
//! splits, the accuracy metrics used to score a held-out partition, and the
//! return-on-investment formula.

use thiserror::Error;

pub mod metrics;
pub mod returns;
pub mod stats;

/// Errors that can occur in revenue-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for ROI math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use metrics::RegressionMetrics;
pub use returns::return_on_investment;
