//! # Ad ROI Workspace
//!
//! Facade over the workspace crates:
//!
//! - [`math`]: statistics, regression metrics and the ROI formula
//! - [`forecast`]: encoding, the random forest, advisory rules and artifacts
//!
//! ## Example
//!
//! ```
//! use ad_roi_workspace::forecast::{CampaignRecord, ReferenceDataset, RevenuePredictor, TrainingConfig};
//!
//! let config = TrainingConfig::default().with_tree_count(10);
//! let predictor = RevenuePredictor::train(&ReferenceDataset, &config).unwrap();
//!
//! let result = predictor.predict(&CampaignRecord::default()).unwrap();
//! assert_eq!(result.cost, 1000.0);
//! assert_eq!(result.feature_impact.values().len(), 7);
//! ```

pub use roi_forecast as forecast;
pub use roi_math as math;

pub use roi_forecast::{CampaignRecord, PredictionResult, RevenuePredictor, RoiError};
