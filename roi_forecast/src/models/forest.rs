//! Random forest regressor
//!
//! Each tree is grown on a bootstrap resample of the training rows and
//! examines a shuffled subset of features at every split. All randomness
//! flows from one seeded generator, so a fixed seed and sample order always
//! produce the same forest.

use crate::data::TrainingSample;
use crate::error::{Result, RoiError};
use crate::features::{FeatureImportance, FEATURE_COUNT};
use crate::models::tree::{MaxFeatures, RegressionTree, TreeParams};
use crate::models::{check_row, to_rows, FittedRevenueModel, RevenueModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Unfitted random forest configuration
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    /// Name of the model
    name: String,
    tree_count: usize,
    seed: u64,
    tree_params: TreeParams,
}

impl RandomForestRegressor {
    /// Create a forest of `tree_count` trees
    pub fn new(tree_count: usize) -> Result<Self> {
        if tree_count == 0 {
            return Err(RoiError::InvalidParameter(
                "Tree count must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Random Forest Regressor (trees={})", tree_count),
            tree_count,
            seed: 0,
            tree_params: TreeParams::default(),
        })
    }

    /// Seed for bootstrap sampling and feature shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Limit the depth of every tree
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.tree_params.max_depth = Some(max_depth);
        self
    }

    /// Minimum samples each child of a split must keep
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.tree_params.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Candidate features per split
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.tree_params.max_features = max_features;
        self
    }

    /// Number of trees
    pub fn tree_count(&self) -> usize {
        self.tree_count
    }

    /// Seed driving all randomness
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RevenueModel for RandomForestRegressor {
    type Fitted = TrainedRandomForest;

    fn fit(&self, samples: &[TrainingSample]) -> Result<Self::Fitted> {
        self.tree_params.validate()?;
        let (rows, targets) = to_rows(samples)?;
        let n_samples = rows.len();

        info!(
            trees = self.tree_count,
            samples = n_samples,
            seed = self.seed,
            "fitting random forest"
        );

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.tree_count);
        let mut importance_sum = [0.0; FEATURE_COUNT];

        for tree_index in 0..self.tree_count {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());
            let bootstrap: Vec<usize> = (0..n_samples)
                .map(|_| tree_rng.gen_range(0..n_samples))
                .collect();

            let tree =
                RegressionTree::grow(&rows, &targets, bootstrap, &self.tree_params, &mut tree_rng)?;

            // Trees that never split contribute nothing rather than a uniform share
            let decrease = tree.impurity_decrease();
            let total: f64 = decrease.iter().sum();
            if total > 0.0 {
                for (sum, value) in importance_sum.iter_mut().zip(decrease) {
                    *sum += value / total;
                }
            }

            debug!(
                tree = tree_index,
                nodes = tree.nodes().len(),
                depth = tree.depth(),
                "grew tree"
            );
            trees.push(tree);
        }

        let mean_importance: Vec<f64> = importance_sum
            .iter()
            .map(|sum| sum / self.tree_count as f64)
            .collect();
        let importance = FeatureImportance::from_weights(&mean_importance)?;

        Ok(TrainedRandomForest {
            name: self.name.clone(),
            seed: self.seed,
            tree_params: self.tree_params,
            trees,
            importance,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted random forest.
///
/// Immutable after fitting; feature importance is computed once during the
/// fit and does not depend on any query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedRandomForest {
    name: String,
    seed: u64,
    tree_params: TreeParams,
    trees: Vec<RegressionTree>,
    importance: FeatureImportance,
}

impl TrainedRandomForest {
    /// Fitted trees
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Seed the forest was fitted with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Growth limits the trees were fitted with
    pub fn tree_params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// Check every tree before the forest is used for prediction
    pub(crate) fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(RoiError::SchemaMismatch(
                "Forest contains no trees".to_string(),
            ));
        }

        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|err| match err {
                RoiError::SchemaMismatch(reason) => {
                    RoiError::SchemaMismatch(format!("Tree {}: {}", index, reason))
                }
                other => other,
            })?;
        }

        Ok(())
    }
}

impl FittedRevenueModel for TrainedRandomForest {
    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_row(row)?;
        if self.trees.is_empty() {
            return Err(RoiError::InsufficientData(
                "Forest contains no trees".to_string(),
            ));
        }

        let total: f64 = self.trees.iter().map(|tree| tree.leaf_value(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    fn feature_importance(&self) -> &FeatureImportance {
        &self.importance
    }

    fn name(&self) -> &str {
        &self.name
    }
}
