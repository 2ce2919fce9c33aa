//! Output record of a prediction

use crate::advisory::Advice;
use crate::error::Result;
use crate::features::FeatureImportance;
use serde::{Deserialize, Serialize};

/// Prediction, ROI, feature impact and advisory text for one campaign.
///
/// Serializes with exactly six keys: `roi`, `revenue`, `cost`,
/// `featureImpact`, `analysis` and `suggestions`. `analysis[i]` and
/// `suggestions[i]` always come from the same diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub roi: f64,
    pub revenue: f64,
    pub cost: f64,
    pub feature_impact: FeatureImportance,
    pub analysis: Vec<String>,
    pub suggestions: Vec<String>,
}

impl PredictionResult {
    /// Combine a prediction and its advice into the output record
    pub fn assemble(
        revenue: f64,
        cost: f64,
        feature_impact: FeatureImportance,
        advice: Advice,
    ) -> Self {
        let (analysis, suggestions) = advice
            .diagnoses
            .into_iter()
            .map(|d| (d.analysis, d.suggestion))
            .unzip();

        Self {
            roi: advice.roi,
            revenue,
            cost,
            feature_impact,
            analysis,
            suggestions,
        }
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
