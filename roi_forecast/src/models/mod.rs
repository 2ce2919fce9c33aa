//! Revenue regression models

use crate::data::TrainingSample;
use crate::error::{Result, RoiError};
use crate::features::{FeatureImportance, FeatureVector, FEATURE_COUNT};
use std::fmt::Debug;

/// Fitted model that maps a feature vector to predicted revenue
pub trait FittedRevenueModel: Debug + Send + Sync {
    /// Predict revenue for a raw row in schema order
    fn predict_row(&self, row: &[f64]) -> Result<f64>;

    /// Predict revenue for a feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.predict_row(&features.to_array())
    }

    /// Per-feature importance, fixed at fit time
    fn feature_importance(&self) -> &FeatureImportance;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Revenue model that can be fitted on labeled samples
pub trait RevenueModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedRevenueModel;

    /// Fit the model on training samples
    fn fit(&self, samples: &[TrainingSample]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Reject rows whose arity differs from the schema or that hold non-finite values
pub(crate) fn check_row(row: &[f64]) -> Result<()> {
    if row.len() != FEATURE_COUNT {
        return Err(RoiError::DimensionMismatch {
            expected: FEATURE_COUNT,
            actual: row.len(),
        });
    }
    if let Some(value) = row.iter().find(|v| !v.is_finite()) {
        return Err(RoiError::DataError(format!(
            "Feature values must be finite, got {}",
            value
        )));
    }
    Ok(())
}

/// Split samples into schema-ordered rows and targets
pub(crate) fn to_rows(samples: &[TrainingSample]) -> Result<(Vec<[f64; FEATURE_COUNT]>, Vec<f64>)> {
    if samples.is_empty() {
        return Err(RoiError::InsufficientData(
            "Cannot fit a model with zero samples".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(samples.len());
    let mut targets = Vec::with_capacity(samples.len());
    for sample in samples {
        let row = sample.features.to_array();
        check_row(&row)?;
        if !sample.target.is_finite() {
            return Err(RoiError::DataError(format!(
                "Revenue targets must be finite, got {}",
                sample.target
            )));
        }
        rows.push(row);
        targets.push(sample.target);
    }

    Ok((rows, targets))
}

pub mod forest;
pub mod tree;

pub use forest::{RandomForestRegressor, TrainedRandomForest};
pub use tree::{DecisionTreeRegressor, MaxFeatures, RegressionTree, TreeParams};
