//! Feature schema and conversion from campaign records to model inputs

use crate::encoder::CategoryEncoder;
use crate::error::{Result, RoiError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Number of features in the model schema
pub const FEATURE_COUNT: usize = 7;

/// Feature names in schema order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "ad_cost",
    "cultural_trend",
    "population",
    "search_trends",
    "competitor_count",
    "policy_impact",
    "ad_approach",
];

/// One named column of the model schema.
///
/// The discriminant is the column index; training and inference must agree
/// on it, so the order of [`Feature::ALL`] is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    AdCost = 0,
    CulturalTrend = 1,
    Population = 2,
    SearchTrends = 3,
    CompetitorCount = 4,
    PolicyImpact = 5,
    AdApproach = 6,
}

impl Feature {
    /// All features in schema order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::AdCost,
        Feature::CulturalTrend,
        Feature::Population,
        Feature::SearchTrends,
        Feature::CompetitorCount,
        Feature::PolicyImpact,
        Feature::AdApproach,
    ];

    /// Column index in the schema
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case feature name
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Look a feature up by its snake-case name
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Market factors of a campaign record, as received on the wire
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFactors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultural_trend: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_trends: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_impact: Option<f64>,
}

/// Structured campaign input.
///
/// Every field is optional at the type level so that an absent value can be
/// reported as [`RoiError::MissingField`] instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<MarketFactors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_approach: Option<String>,
}

impl Default for CampaignRecord {
    /// The record used when a caller supplies no input
    fn default() -> Self {
        Self {
            ad_cost: Some(1000.0),
            factors: Some(MarketFactors {
                cultural_trend: Some(50.0),
                population: Some(1_000_000.0),
                search_trends: Some(50.0),
                competitor_count: Some(2.0),
                policy_impact: Some(0.8),
            }),
            ad_approach: Some("informative".to_string()),
        }
    }
}

impl CampaignRecord {
    /// Parse a record from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn require(value: Option<f64>, name: &str) -> Result<f64> {
    value.ok_or_else(|| RoiError::MissingField(name.to_string()))
}

/// Ordered numeric model input.
///
/// Field order matches [`Feature::ALL`]; `ad_approach` holds the encoded
/// category code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub ad_cost: f64,
    pub cultural_trend: f64,
    pub population: f64,
    pub search_trends: f64,
    pub competitor_count: f64,
    pub policy_impact: f64,
    pub ad_approach: f64,
}

impl FeatureVector {
    /// Build the model input from a campaign record.
    ///
    /// Fails with [`RoiError::MissingField`] when any of the seven inputs is
    /// absent and with [`RoiError::UnknownCategory`] when the ad approach is
    /// not known to `encoder`.
    pub fn from_record(record: &CampaignRecord, encoder: &CategoryEncoder) -> Result<Self> {
        let ad_cost = require(record.ad_cost, "adCost")?;
        let factors = record
            .factors
            .as_ref()
            .ok_or_else(|| RoiError::MissingField("factors".to_string()))?;
        let approach = record
            .ad_approach
            .as_deref()
            .ok_or_else(|| RoiError::MissingField("adApproach".to_string()))?;

        Ok(Self {
            ad_cost,
            cultural_trend: require(factors.cultural_trend, "factors.culturalTrend")?,
            population: require(factors.population, "factors.population")?,
            search_trends: require(factors.search_trends, "factors.searchTrends")?,
            competitor_count: require(factors.competitor_count, "factors.competitorCount")?,
            policy_impact: require(factors.policy_impact, "factors.policyImpact")?,
            ad_approach: encoder.encode(approach)? as f64,
        })
    }

    /// Values in schema order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ad_cost,
            self.cultural_trend,
            self.population,
            self.search_trends,
            self.competitor_count,
            self.policy_impact,
            self.ad_approach,
        ]
    }

    /// Value of a single feature
    pub fn get(&self, feature: Feature) -> f64 {
        self.to_array()[feature.index()]
    }
}

/// Slack allowed on the sum of stored importances
const IMPORTANCE_SUM_TOLERANCE: f64 = 1e-6;

/// Per-feature importance of a fitted model, aligned to the schema.
///
/// Values are non-negative and sum to one. Serializes as a JSON object whose
/// keys follow schema order.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "HashMap<String, f64>")]
pub struct FeatureImportance {
    values: [f64; FEATURE_COUNT],
}

impl FeatureImportance {
    /// Normalize raw per-feature weights so they sum to one.
    ///
    /// All-zero weights (a model that never split) become a uniform
    /// distribution.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        if weights.len() != FEATURE_COUNT {
            return Err(RoiError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: weights.len(),
            });
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RoiError::InvalidParameter(
                "Importance weights must be finite and non-negative".to_string(),
            ));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Ok(Self::uniform());
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (value, weight) in values.iter_mut().zip(weights) {
            *value = weight / total;
        }

        Ok(Self { values })
    }

    /// Equal importance for every feature
    pub fn uniform() -> Self {
        Self {
            values: [1.0 / FEATURE_COUNT as f64; FEATURE_COUNT],
        }
    }

    /// Importance of a single feature
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Importances in schema order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// `(feature, importance)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |&f| (f, self.values[f.index()]))
    }

    /// Features sorted by descending importance.
    ///
    /// The sort is stable, so ties keep schema order.
    pub fn ranked(&self) -> Vec<(Feature, f64)> {
        let mut ranked: Vec<(Feature, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Serialize for FeatureImportance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, importance) in self.iter() {
            map.serialize_entry(feature.name(), &importance)?;
        }
        map.end()
    }
}

impl TryFrom<HashMap<String, f64>> for FeatureImportance {
    type Error = RoiError;

    fn try_from(map: HashMap<String, f64>) -> Result<Self> {
        if map.len() != FEATURE_COUNT {
            return Err(RoiError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: map.len(),
            });
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (value, name) in values.iter_mut().zip(FEATURE_NAMES) {
            *value = *map.get(name).ok_or_else(|| {
                RoiError::SchemaMismatch(format!("importance for '{}' is missing", name))
            })?;
        }

        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RoiError::SchemaMismatch(
                "importances must be finite and non-negative".to_string(),
            ));
        }
        let total: f64 = values.iter().sum();
        if (total - 1.0).abs() > IMPORTANCE_SUM_TOLERANCE {
            return Err(RoiError::SchemaMismatch(format!(
                "importances sum to {} instead of 1",
                total
            )));
        }

        Ok(Self { values })
    }
}
