//! End-to-end revenue predictor: encode, predict, advise, assemble

use crate::advisory::AdvisoryEngine;
use crate::config::TrainingConfig;
use crate::data::{TrainingSample, TrainingSet, TrainingSource};
use crate::encoder::CategoryEncoder;
use crate::error::{Result, RoiError};
use crate::features::{CampaignRecord, FeatureImportance, FeatureVector};
use crate::models::{FittedRevenueModel, RevenueModel, TrainedRandomForest};
use crate::result::PredictionResult;
use crate::utils::train_test_split;
use roi_math::metrics::{evaluate_regression, RegressionMetrics};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Where the samples came from
    pub source: String,
    pub config: TrainingConfig,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Accuracy on the held-out partition
    pub test_metrics: RegressionMetrics,
}

/// Fitted forest together with the encoder it was trained with.
///
/// Immutable once built, so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct RevenuePredictor {
    encoder: CategoryEncoder,
    model: TrainedRandomForest,
    report: Option<TrainingReport>,
    advisory: AdvisoryEngine,
}

impl RevenuePredictor {
    /// Assemble a predictor from an already fitted model and its encoder
    pub fn new(encoder: CategoryEncoder, model: TrainedRandomForest) -> Self {
        Self {
            encoder,
            model,
            report: None,
            advisory: AdvisoryEngine::default(),
        }
    }

    /// Attach the report of the run that produced the model
    pub fn with_report(mut self, report: TrainingReport) -> Self {
        self.report = Some(report);
        self
    }

    /// Use a custom advisory engine
    pub fn with_advisory(mut self, advisory: AdvisoryEngine) -> Self {
        self.advisory = advisory;
        self
    }

    /// Load samples, fit the encoder, split, fit the forest and score it on
    /// the held-out partition.
    pub fn train(source: &dyn TrainingSource, config: &TrainingConfig) -> Result<Self> {
        config.validate()?;

        let campaigns = source.load()?;
        info!(source = %source.describe(), campaigns = campaigns.len(), "training revenue predictor");

        let set = TrainingSet::encode(&campaigns, config.code_order)?;
        let (train, test) = train_test_split(&set.samples, config.test_fraction, config.seed)?;

        let model = config.regressor()?.fit(&train)?;
        let test_metrics = evaluate(&model, &test)?;
        info!(
            train = train.len(),
            test = test.len(),
            mae = test_metrics.mae,
            rmse = test_metrics.rmse,
            "trained revenue predictor"
        );

        let report = TrainingReport {
            source: source.describe(),
            config: *config,
            train_samples: train.len(),
            test_samples: test.len(),
            test_metrics,
        };

        Ok(Self::new(set.encoder, model).with_report(report))
    }

    /// Predict revenue and ROI for a campaign and attach advice.
    ///
    /// Deterministic: the same record always yields the same result.
    pub fn predict(&self, record: &CampaignRecord) -> Result<PredictionResult> {
        let features = FeatureVector::from_record(record, &self.encoder)?;
        let revenue = self.model.predict(&features)?;
        let importance = *self.model.feature_importance();
        let advice = self
            .advisory
            .advise(revenue, features.ad_cost, &features, &importance);

        debug!(revenue, roi = advice.roi, diagnoses = advice.diagnoses.len(), "predicted campaign");

        Ok(PredictionResult::assemble(
            revenue,
            features.ad_cost,
            importance,
            advice,
        ))
    }

    /// Encoder shared by training and inference
    pub fn encoder(&self) -> &CategoryEncoder {
        &self.encoder
    }

    /// The fitted forest
    pub fn model(&self) -> &TrainedRandomForest {
        &self.model
    }

    /// Feature importance of the fitted forest
    pub fn feature_importance(&self) -> &FeatureImportance {
        self.model.feature_importance()
    }

    /// Report of the training run, if known
    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }
}

fn evaluate(model: &TrainedRandomForest, test: &[TrainingSample]) -> Result<RegressionMetrics> {
    let predicted = test
        .iter()
        .map(|sample| model.predict(&sample.features))
        .collect::<Result<Vec<f64>>>()?;
    let actual: Vec<f64> = test.iter().map(|sample| sample.target).collect();

    Ok(evaluate_regression(&predicted, &actual)?)
}

/// Predictor shared between concurrent requests.
///
/// Readers take a cheap `Arc` snapshot; retraining swaps the snapshot under
/// the write lock, and in-flight requests finish on the model they started
/// with.
#[derive(Debug, Clone)]
pub struct SharedPredictor {
    inner: Arc<RwLock<Arc<RevenuePredictor>>>,
}

impl SharedPredictor {
    /// Share `predictor`
    pub fn new(predictor: RevenuePredictor) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(predictor))),
        }
    }

    /// Current predictor snapshot
    pub fn current(&self) -> Result<Arc<RevenuePredictor>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| RoiError::DataError("Predictor lock poisoned".to_string()))?;
        Ok(Arc::clone(&guard))
    }

    /// Predict with the current snapshot
    pub fn predict(&self, record: &CampaignRecord) -> Result<PredictionResult> {
        self.current()?.predict(record)
    }

    /// Replace the predictor, e.g. after retraining
    pub fn replace(&self, predictor: RevenuePredictor) -> Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| RoiError::DataError("Predictor lock poisoned".to_string()))?;
        *guard = Arc::new(predictor);
        info!("replaced shared revenue predictor");
        Ok(())
    }

    /// Retrain from `source` and swap in the result.
    ///
    /// Training runs outside the lock; only the swap is exclusive.
    pub fn retrain(&self, source: &dyn TrainingSource, config: &TrainingConfig) -> Result<()> {
        let predictor = RevenuePredictor::train(source, config)?;
        self.replace(predictor)
    }
}
