//! # ROI Forecast
//!
//! Predicts advertising revenue from campaign features and explains
//! low-ROI predictions.
//!
//! ## Features
//!
//! - Category encoding of the ad approach, fitted once and shared explicitly
//! - A fixed 7-feature schema built from structured campaign records
//! - Random forest regression with impurity-based feature importance
//! - A declarative rule table that turns dominant features into diagnostics
//! - JSON model artifacts that carry their schema and encoder
//! - Ad cost estimation by channel and approach
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roi_forecast::{CampaignRecord, ReferenceDataset, RevenuePredictor, TrainingConfig};
//!
//! // Train on the reference campaigns
//! let predictor = RevenuePredictor::train(&ReferenceDataset, &TrainingConfig::default())?;
//!
//! // Predict the default campaign
//! let result = predictor.predict(&CampaignRecord::default())?;
//! println!("{}", result.to_json()?);
//! # Ok::<(), roi_forecast::RoiError>(())
//! ```

pub mod advisory;
pub mod artifact;
pub mod config;
pub mod cost;
pub mod data;
pub mod encoder;
pub mod error;
pub mod features;
pub mod models;
pub mod predictor;
pub mod result;
pub mod utils;

// Re-export commonly used types
pub use crate::advisory::{Advice, AdvisoryEngine, Diagnosis};
pub use crate::artifact::ModelArtifact;
pub use crate::config::TrainingConfig;
pub use crate::data::{CampaignSample, CsvTrainingSource, ReferenceDataset, TrainingSample, TrainingSource};
pub use crate::encoder::{CategoryEncoder, CodeOrder};
pub use crate::error::{Result, RoiError};
pub use crate::features::{CampaignRecord, Feature, FeatureImportance, FeatureVector, MarketFactors};
pub use crate::models::{FittedRevenueModel, RandomForestRegressor, RevenueModel, TrainedRandomForest};
pub use crate::predictor::{RevenuePredictor, SharedPredictor, TrainingReport};
pub use crate::result::PredictionResult;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
