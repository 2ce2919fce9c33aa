//! Training configuration

use crate::encoder::CodeOrder;
use crate::error::{Result, RoiError};
use crate::models::{MaxFeatures, RandomForestRegressor};
use serde::{Deserialize, Serialize};

/// Parameters for training a revenue predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of trees in the forest
    pub tree_count: usize,
    /// Seed for the split, bootstrap sampling and feature shuffling
    pub seed: u64,
    /// Share of samples held out for evaluation
    pub test_fraction: f64,
    /// Optional depth limit for every tree
    pub max_depth: Option<usize>,
    /// Candidate features per split
    pub max_features: MaxFeatures,
    /// How ad approach labels are assigned codes
    pub code_order: CodeOrder,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            tree_count: 100,
            seed: 42,
            test_fraction: 0.2,
            max_depth: None,
            max_features: MaxFeatures::All,
            code_order: CodeOrder::Lexicographic,
        }
    }
}

impl TrainingConfig {
    /// Set the number of trees
    pub fn with_tree_count(mut self, tree_count: usize) -> Self {
        self.tree_count = tree_count;
        self
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the held-out share
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.tree_count == 0 {
            return Err(RoiError::InvalidParameter(
                "Tree count must be positive".to_string(),
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(RoiError::InvalidParameter(format!(
                "Test fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }

    /// Forest regressor configured from these parameters
    pub fn regressor(&self) -> Result<RandomForestRegressor> {
        let mut regressor = RandomForestRegressor::new(self.tree_count)?
            .with_seed(self.seed)
            .with_max_features(self.max_features);
        if let Some(max_depth) = self.max_depth {
            regressor = regressor.with_max_depth(max_depth);
        }
        Ok(regressor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();

        assert_eq!(config.tree_count, 100);
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(TrainingConfig::default().with_tree_count(0).validate().is_err());
        assert!(TrainingConfig::default().with_test_fraction(0.0).validate().is_err());
        assert!(TrainingConfig::default().with_test_fraction(1.5).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig = serde_json::from_str(r#"{"tree_count": 10}"#).unwrap();

        assert_eq!(config.tree_count, 10);
        assert_eq!(config.seed, 42);
        assert_eq!(config.code_order, CodeOrder::Lexicographic);
    }

    #[test]
    fn test_regressor_from_config() {
        let regressor = TrainingConfig::default().with_seed(9).regressor().unwrap();

        assert_eq!(regressor.tree_count(), 100);
        assert_eq!(regressor.seed(), 9);
    }
}
