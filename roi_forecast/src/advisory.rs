//! Rule-based ROI advisory
//!
//! Turns a revenue prediction into an ROI figure and, for underperforming
//! campaigns, into diagnostics tied to the model's most important features.

use crate::features::{Feature, FeatureImportance, FeatureVector};
use roi_math::return_on_investment;
use serde::{Deserialize, Serialize};

/// Campaigns with an ROI strictly below this are underperforming
pub const ROI_THRESHOLD: f64 = 0.1;

/// Number of top-ranked features inspected for diagnostics
pub const TOP_FACTORS: usize = 2;

/// Default importance a feature must strictly exceed to produce a diagnosis
pub const IMPORTANCE_THRESHOLD: f64 = 0.2;

const POSITIVE_ANALYSIS: &str = "ROI is positive. Performance is driven by balanced factors.";
const POSITIVE_SUGGESTION: &str =
    "Maintain current strategy or experiment with higher ad spend for scale.";

/// A diagnostic paired with the suggestion that addresses it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub analysis: String,
    pub suggestion: String,
}

/// Rule mapping a dominant feature to diagnostic text
pub struct DiagnosticRule {
    pub feature: Feature,
    /// Importance the feature must strictly exceed
    pub min_importance: f64,
    /// Renders the analysis line from the raw input values
    pub render: fn(&FeatureVector) -> String,
    pub suggestion: &'static str,
}

fn render_ad_cost(factors: &FeatureVector) -> String {
    format!(
        "High ad cost (${:.2}) is significantly reducing ROI.",
        factors.ad_cost
    )
}

fn render_competition(factors: &FeatureVector) -> String {
    format!(
        "High competition ({} competitors) is impacting performance.",
        factors.competitor_count
    )
}

fn render_search_trends(factors: &FeatureVector) -> String {
    format!(
        "Low search trends ({}) indicate weak demand.",
        factors.search_trends
    )
}

fn render_cultural_trend(factors: &FeatureVector) -> String {
    format!(
        "Low cultural trends ({}) suggest poor market fit.",
        factors.cultural_trend
    )
}

fn render_policy_impact(factors: &FeatureVector) -> String {
    format!(
        "Unfavorable policies (score: {:.2}) are limiting ROI.",
        factors.policy_impact
    )
}

/// Diagnostic rules. Population and ad approach have no entry, so a top
/// ranking for either yields no diagnosis.
pub static DIAGNOSTIC_RULES: &[DiagnosticRule] = &[
    DiagnosticRule {
        feature: Feature::AdCost,
        min_importance: IMPORTANCE_THRESHOLD,
        render: render_ad_cost,
        suggestion: "Reduce ad spend or switch to a lower-cost ad type (e.g., PPC).",
    },
    DiagnosticRule {
        feature: Feature::CompetitorCount,
        min_importance: IMPORTANCE_THRESHOLD,
        render: render_competition,
        suggestion: "Target a less competitive market or use comparative ads.",
    },
    DiagnosticRule {
        feature: Feature::SearchTrends,
        min_importance: IMPORTANCE_THRESHOLD,
        render: render_search_trends,
        suggestion: "Use emotive or persuasive ads to boost interest.",
    },
    DiagnosticRule {
        feature: Feature::CulturalTrend,
        min_importance: IMPORTANCE_THRESHOLD,
        render: render_cultural_trend,
        suggestion: "Adjust product positioning or target a different region.",
    },
    DiagnosticRule {
        feature: Feature::PolicyImpact,
        min_importance: IMPORTANCE_THRESHOLD,
        render: render_policy_impact,
        suggestion: "Explore markets with more favorable regulations.",
    },
];

/// ROI and diagnoses for one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub roi: f64,
    pub diagnoses: Vec<Diagnosis>,
}

impl Advice {
    /// Whether the ROI fell below [`ROI_THRESHOLD`]
    pub fn is_underperforming(&self) -> bool {
        self.roi < ROI_THRESHOLD
    }
}

/// Applies a rule table to predictions
#[derive(Clone, Copy)]
pub struct AdvisoryEngine {
    rules: &'static [DiagnosticRule],
}

impl Default for AdvisoryEngine {
    fn default() -> Self {
        Self {
            rules: DIAGNOSTIC_RULES,
        }
    }
}

impl std::fmt::Debug for AdvisoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.feature).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AdvisoryEngine {
    /// Engine using a custom rule table
    pub fn with_rules(rules: &'static [DiagnosticRule]) -> Self {
        Self { rules }
    }

    fn rule_for(&self, feature: Feature) -> Option<&DiagnosticRule> {
        self.rules.iter().find(|rule| rule.feature == feature)
    }

    /// Compute ROI and the matching diagnoses.
    ///
    /// A non-underperforming campaign always gets the single positive
    /// diagnosis. Otherwise each of the [`TOP_FACTORS`] highest-ranked
    /// features produces at most one diagnosis; the result may be empty.
    pub fn advise(
        &self,
        revenue: f64,
        cost: f64,
        factors: &FeatureVector,
        importance: &FeatureImportance,
    ) -> Advice {
        let roi = return_on_investment(revenue, cost);

        if roi >= ROI_THRESHOLD {
            return Advice {
                roi,
                diagnoses: vec![Diagnosis {
                    analysis: POSITIVE_ANALYSIS.to_string(),
                    suggestion: POSITIVE_SUGGESTION.to_string(),
                }],
            };
        }

        let diagnoses = importance
            .ranked()
            .into_iter()
            .take(TOP_FACTORS)
            .filter_map(|(feature, weight)| {
                let rule = self.rule_for(feature)?;
                (weight > rule.min_importance).then(|| Diagnosis {
                    analysis: (rule.render)(factors),
                    suggestion: rule.suggestion.to_string(),
                })
            })
            .collect();

        Advice { roi, diagnoses }
    }
}
