//! CART regression tree with MSE impurity
//!
//! Nodes live in a flat arena so that prediction is an iterative walk and a
//! serialized tree does not nest one JSON level per tree level.

use crate::data::TrainingSample;
use crate::error::{Result, RoiError};
use crate::features::{FeatureImportance, FEATURE_COUNT};
use crate::models::{check_row, to_rows, FittedRevenueModel, RevenueModel};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use roi_math::stats::{mean, variance, weighted_impurity_decrease, Moments};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Nodes whose target variance falls below this are treated as pure
const PURE_NODE_VARIANCE: f64 = 1e-12;

/// Splits must remove more than this share of the parent's squared error
const MIN_RELATIVE_DECREASE: f64 = 1e-12;

/// Number of candidate features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Every feature (the usual choice for regression forests)
    #[default]
    All,
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// A fixed count, clamped to `[1, n_features]`
    Count(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Count(count) => count.clamp(1, n_features),
        }
    }
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root has depth 0); `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum samples each child of a split must keep
    pub min_samples_leaf: usize,
    /// Candidate features per split
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
        }
    }
}

impl TreeParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(RoiError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(RoiError::InvalidParameter(
                "min_samples_leaf must be positive".to_string(),
            ));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(RoiError::InvalidParameter(
                "max_features must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A node of a fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples
    Leaf { value: f64, n_samples: usize },
    /// Internal node; rows with `row[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        n_samples: usize,
        left: usize,
        right: usize,
    },
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    name: String,
    nodes: Vec<TreeNode>,
    /// Sample-weighted impurity decrease accumulated per feature
    impurity_decrease: [f64; FEATURE_COUNT],
    importance: FeatureImportance,
}

impl RegressionTree {
    /// Grow a tree on the rows selected by `indices` (duplicates allowed,
    /// as produced by bootstrap sampling).
    pub(crate) fn grow(
        rows: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        indices: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if indices.is_empty() {
            return Err(RoiError::InsufficientData(
                "Cannot grow a tree without samples".to_string(),
            ));
        }

        let mut builder = TreeBuilder {
            rows,
            targets,
            params,
            rng,
            nodes: Vec::new(),
            impurity_decrease: [0.0; FEATURE_COUNT],
        };
        builder.build(indices)?;

        let importance = FeatureImportance::from_weights(&builder.impurity_decrease)?;

        Ok(Self {
            name: "Decision Tree Regressor".to_string(),
            nodes: builder.nodes,
            impurity_decrease: builder.impurity_decrease,
            importance,
        })
    }

    /// Arena of nodes; index 0 is the root
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Raw sample-weighted impurity decrease per feature
    pub fn impurity_decrease(&self) -> &[f64; FEATURE_COUNT] {
        &self.impurity_decrease
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            match &self.nodes[index] {
                TreeNode::Leaf { .. } => deepest = deepest.max(depth),
                TreeNode::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Check that the arena forms a well-formed tree over the schema.
    ///
    /// Children always sit after their parent, so a valid arena cannot
    /// cycle and every walk from the root ends at a leaf.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(RoiError::SchemaMismatch("Tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(RoiError::SchemaMismatch(format!(
                            "Leaf {} holds a non-finite value",
                            index
                        )));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(RoiError::SchemaMismatch(format!(
                            "Node {} splits on feature {} but the schema has {}",
                            index, feature, FEATURE_COUNT
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(RoiError::SchemaMismatch(format!(
                            "Node {} has a non-finite threshold",
                            index
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(RoiError::SchemaMismatch(format!(
                                "Node {} points to child {} outside ({}, {})",
                                index,
                                child,
                                index,
                                self.nodes.len()
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Leaf value reached by `row`; the row must already be validated
    pub(crate) fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl FittedRevenueModel for RegressionTree {
    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_row(row)?;
        Ok(self.leaf_value(row))
    }

    fn feature_importance(&self) -> &FeatureImportance {
        &self.importance
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// Which child slot of a split a pending node fills
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Node waiting to be grown
struct PendingNode {
    indices: Vec<usize>,
    depth: usize,
    parent: Option<(usize, Side)>,
}

struct TreeBuilder<'a> {
    rows: &'a [[f64; FEATURE_COUNT]],
    targets: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<TreeNode>,
    impurity_decrease: [f64; FEATURE_COUNT],
}

impl TreeBuilder<'_> {
    /// Grow the tree rooted at `indices`.
    ///
    /// Nodes are expanded depth first with the left child before the right,
    /// so arena order and random draws are fixed for a given seed. An
    /// explicit stack keeps deep trees off the call stack.
    fn build(&mut self, indices: Vec<usize>) -> Result<()> {
        let mut pending = vec![PendingNode {
            indices,
            depth: 0,
            parent: None,
        }];

        while let Some(PendingNode {
            indices,
            depth,
            parent,
        }) = pending.pop()
        {
            let node_index = self.nodes.len();
            if let Some((parent_index, side)) = parent {
                if let TreeNode::Split { left, right, .. } = &mut self.nodes[parent_index] {
                    match side {
                        Side::Left => *left = node_index,
                        Side::Right => *right = node_index,
                    }
                }
            }

            let ys: Vec<f64> = indices.iter().map(|&i| self.targets[i]).collect();
            let n_samples = indices.len();
            self.nodes.push(TreeNode::Leaf {
                value: mean(&ys)?,
                n_samples,
            });

            let at_max_depth = self.params.max_depth.is_some_and(|max| depth >= max);
            if n_samples < self.params.min_samples_split
                || at_max_depth
                || variance(&ys)? < PURE_NODE_VARIANCE
            {
                continue;
            }

            let Some(split) = self.find_best_split(&indices, &ys)? else {
                continue;
            };

            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| self.rows[i][split.feature] <= split.threshold);

            trace!(
                depth,
                feature = split.feature,
                threshold = split.threshold,
                decrease = split.decrease,
                "split node"
            );
            self.impurity_decrease[split.feature] += split.decrease;
            self.nodes[node_index] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                n_samples,
                left: node_index,
                right: node_index,
            };

            pending.push(PendingNode {
                indices: right_indices,
                depth: depth + 1,
                parent: Some((node_index, Side::Right)),
            });
            pending.push(PendingNode {
                indices: left_indices,
                depth: depth + 1,
                parent: Some((node_index, Side::Left)),
            });
        }

        Ok(())
    }

    /// Search a random subset of features for the split with the largest
    /// impurity decrease. Ties keep the first candidate examined.
    ///
    /// Each feature is swept once in sorted order, pricing every threshold
    /// from running moments of the targets on the left.
    fn find_best_split(&mut self, indices: &[usize], ys: &[f64]) -> Result<Option<SplitCandidate>> {
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        features.shuffle(&mut *self.rng);
        features.truncate(self.params.max_features.resolve(FEATURE_COUNT));

        let parent = Moments::from_values(ys);
        let n_samples = indices.len();
        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;

        for feature in features {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

            let mut left = Moments::new();
            for (position, pair) in order.windows(2).enumerate() {
                left.push(self.targets[pair[0]]);

                let value = self.rows[pair[0]][feature];
                let next = self.rows[pair[1]][feature];
                if value == next {
                    continue;
                }

                let n_left = position + 1;
                if n_left < min_leaf || n_samples - n_left < min_leaf {
                    continue;
                }

                let threshold = (value + next) / 2.0;
                if !(value <= threshold && threshold < next) {
                    continue;
                }

                let decrease = weighted_impurity_decrease(&parent, &left)?;
                let floor = best
                    .as_ref()
                    .map_or(parent.squared_error() * MIN_RELATIVE_DECREASE, |b| b.decrease);
                if decrease > floor {
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        decrease,
                    });
                }
            }
        }

        Ok(best)
    }
}

/// Single CART regression tree
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    /// Name of the model
    name: String,
    params: TreeParams,
    seed: u64,
}

impl DecisionTreeRegressor {
    /// Create a tree regressor with default growth limits
    pub fn new() -> Self {
        Self {
            name: "Decision Tree Regressor".to_string(),
            params: TreeParams::default(),
            seed: 0,
        }
    }

    /// Limit the depth of the tree
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.params.max_depth = Some(max_depth);
        self
    }

    /// Minimum samples each child must keep
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.params.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Candidate features per split
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.params.max_features = max_features;
        self
    }

    /// Seed for the per-node feature shuffle
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl RevenueModel for DecisionTreeRegressor {
    type Fitted = RegressionTree;

    fn fit(&self, samples: &[TrainingSample]) -> Result<Self::Fitted> {
        self.params.validate()?;
        let (rows, targets) = to_rows(samples)?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        RegressionTree::grow(&rows, &targets, (0..rows.len()).collect(), &self.params, &mut rng)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Feature, FeatureVector};
    use approx::assert_relative_eq;

    fn sample(ad_cost: f64, search_trends: f64, target: f64) -> TrainingSample {
        TrainingSample {
            features: FeatureVector {
                ad_cost,
                cultural_trend: 50.0,
                population: 1_000_000.0,
                search_trends,
                competitor_count: 2.0,
                policy_impact: 0.8,
                ad_approach: 0.0,
            },
            target,
        }
    }

    #[test]
    fn test_single_informative_feature() {
        let samples = vec![
            sample(100.0, 50.0, 10.0),
            sample(200.0, 50.0, 10.0),
            sample(300.0, 50.0, 30.0),
            sample(400.0, 50.0, 30.0),
        ];
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
        assert_relative_eq!(tree.predict(&samples[0].features).unwrap(), 10.0);
        assert_relative_eq!(tree.predict(&samples[3].features).unwrap(), 30.0);

        // Only ad_cost ever splits
        assert_relative_eq!(tree.feature_importance().get(Feature::AdCost), 1.0);
        assert_relative_eq!(tree.impurity_decrease()[Feature::AdCost.index()], 400.0);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let samples = vec![sample(100.0, 50.0, 1.0), sample(300.0, 50.0, 5.0)];
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        match &tree.nodes()[0] {
            TreeNode::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, Feature::AdCost.index());
                assert_relative_eq!(*threshold, 200.0);
            }
            other => panic!("Expected a split at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let samples = vec![sample(100.0, 10.0, 7.0), sample(200.0, 20.0, 7.0)];
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        assert_eq!(tree.nodes().len(), 1);
        assert_relative_eq!(tree.predict(&samples[1].features).unwrap(), 7.0);
        // No split happened, so importance is spread evenly
        assert_eq!(*tree.feature_importance(), FeatureImportance::uniform());
    }

    #[test]
    fn test_max_depth_zero() {
        let samples = vec![sample(100.0, 50.0, 1.0), sample(300.0, 50.0, 5.0)];
        let tree = DecisionTreeRegressor::new()
            .with_max_depth(0)
            .fit(&samples)
            .unwrap();

        assert_eq!(tree.depth(), 0);
        assert_relative_eq!(tree.predict(&samples[0].features).unwrap(), 3.0);
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_children() {
        let samples = vec![
            sample(100.0, 50.0, 1.0),
            sample(200.0, 50.0, 1.0),
            sample(300.0, 50.0, 9.0),
        ];
        let tree = DecisionTreeRegressor::new()
            .with_min_samples_leaf(2)
            .fit(&samples)
            .unwrap();

        assert_eq!(tree.nodes().len(), 1);
    }

    #[test]
    fn test_prediction_arity() {
        let samples = vec![sample(100.0, 50.0, 1.0), sample(300.0, 50.0, 5.0)];
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        assert!(matches!(
            tree.predict_row(&[1.0, 2.0, 3.0]),
            Err(RoiError::DimensionMismatch {
                expected: 7,
                actual: 3
            })
        ));
        assert!(matches!(
            tree.predict_row(&[f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Err(RoiError::DataError(_))
        ));
    }

    #[test]
    fn test_invalid_params_and_empty_data() {
        assert!(matches!(
            DecisionTreeRegressor::new().fit(&[]),
            Err(RoiError::InsufficientData(_))
        ));
        assert!(matches!(
            DecisionTreeRegressor::new()
                .with_min_samples_leaf(0)
                .fit(&[sample(1.0, 1.0, 1.0)]),
            Err(RoiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_large_training_set_fits_exactly() {
        // Zig-zag targets force a deep, unbalanced tree over one feature
        let samples: Vec<TrainingSample> = (0..2000)
            .map(|i| sample(i as f64, 50.0, ((i * 7919) % 2003) as f64))
            .collect();
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        assert!(tree.validate().is_ok());
        assert_eq!(tree.n_leaves(), 2000);
        for s in samples.iter().step_by(97) {
            assert_eq!(tree.predict(&s.features).unwrap(), s.target);
        }
    }

    #[test]
    fn test_children_follow_their_parent() {
        let samples = vec![
            sample(100.0, 10.0, 1.0),
            sample(200.0, 20.0, 4.0),
            sample(300.0, 30.0, 9.0),
            sample(400.0, 40.0, 16.0),
        ];
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        for (index, node) in tree.nodes().iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = node {
                assert!(*left > index && *right > *left);
            }
        }
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_corrupt_nodes() {
        let samples = vec![sample(100.0, 50.0, 1.0), sample(300.0, 50.0, 5.0)];
        let tree = DecisionTreeRegressor::new().fit(&samples).unwrap();

        let corrupt = |edit: fn(&mut TreeNode)| {
            let mut tree = tree.clone();
            edit(&mut tree.nodes[0]);
            tree.validate()
        };

        assert!(matches!(
            corrupt(|node| if let TreeNode::Split { feature, .. } = node {
                *feature = 99
            }),
            Err(RoiError::SchemaMismatch(_))
        ));
        assert!(matches!(
            corrupt(|node| if let TreeNode::Split { right, .. } = node {
                *right = 10_000
            }),
            Err(RoiError::SchemaMismatch(_))
        ));
        // A child pointing back at its parent would loop forever
        assert!(matches!(
            corrupt(|node| if let TreeNode::Split { left, .. } = node {
                *left = 0
            }),
            Err(RoiError::SchemaMismatch(_))
        ));

        let mut empty = tree.clone();
        empty.nodes.clear();
        assert!(matches!(empty.validate(), Err(RoiError::SchemaMismatch(_))));
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::All.resolve(7), 7);
        assert_eq!(MaxFeatures::Sqrt.resolve(7), 3);
        assert_eq!(MaxFeatures::Count(10).resolve(7), 7);
        assert_eq!(MaxFeatures::Count(2).resolve(7), 2);
    }
}
