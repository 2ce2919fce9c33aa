//! Labeled campaign data for training the revenue model

use crate::encoder::{CategoryEncoder, CodeOrder};
use crate::error::{Result, RoiError};
use crate::features::{CampaignRecord, FeatureVector, MarketFactors};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One labeled campaign: observed factors, ad approach and revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSample {
    pub ad_cost: f64,
    pub cultural_trend: f64,
    pub population: f64,
    pub search_trends: f64,
    pub competitor_count: f64,
    pub policy_impact: f64,
    pub ad_approach: String,
    pub revenue: f64,
}

impl CampaignSample {
    /// The sample's inputs as a campaign record
    pub fn to_record(&self) -> CampaignRecord {
        CampaignRecord {
            ad_cost: Some(self.ad_cost),
            factors: Some(MarketFactors {
                cultural_trend: Some(self.cultural_trend),
                population: Some(self.population),
                search_trends: Some(self.search_trends),
                competitor_count: Some(self.competitor_count),
                policy_impact: Some(self.policy_impact),
            }),
            ad_approach: Some(self.ad_approach.clone()),
        }
    }
}

/// A feature vector paired with its observed revenue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub target: f64,
}

/// Source of labeled campaigns
pub trait TrainingSource {
    /// Load all samples, in a stable order
    fn load(&self) -> Result<Vec<CampaignSample>>;

    /// Human-readable description used in logs
    fn describe(&self) -> String;
}

/// The six hand-authored reference campaigns
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceDataset;

impl TrainingSource for ReferenceDataset {
    fn load(&self) -> Result<Vec<CampaignSample>> {
        let rows: [(f64, f64, f64, f64, f64, f64, &str, f64); 6] = [
            (1000.0, 50.0, 1_000_000.0, 60.0, 2.0, 0.8, "informative", 2000.0),
            (1500.0, 70.0, 1_500_000.0, 80.0, 3.0, 0.9, "persuasive", 3500.0),
            (500.0, 30.0, 500_000.0, 40.0, 1.0, 0.7, "emotive", 1200.0),
            (2000.0, 60.0, 1_200_000.0, 70.0, 2.0, 0.85, "comparative", 2800.0),
            (800.0, 40.0, 800_000.0, 50.0, 1.0, 0.9, "reminder", 1600.0),
            (3000.0, 80.0, 2_000_000.0, 90.0, 4.0, 0.95, "emotive", 5000.0),
        ];

        Ok(rows
            .iter()
            .map(
                |&(ad_cost, cultural, population, search, competitors, policy, approach, revenue)| {
                    CampaignSample {
                        ad_cost,
                        cultural_trend: cultural,
                        population,
                        search_trends: search,
                        competitor_count: competitors,
                        policy_impact: policy,
                        ad_approach: approach.to_string(),
                        revenue,
                    }
                },
            )
            .collect())
    }

    fn describe(&self) -> String {
        "reference dataset".to_string()
    }
}

/// Campaigns stored in a CSV file.
///
/// The file needs a header row naming the columns `ad_cost`,
/// `cultural_trend`, `population`, `search_trends`, `competitor_count`,
/// `policy_impact`, `ad_approach` and `revenue`, in any order.
#[derive(Debug, Clone)]
pub struct CsvTrainingSource {
    path: PathBuf,
}

impl CsvTrainingSource {
    /// Create a source reading from `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TrainingSource for CsvTrainingSource {
    fn load(&self) -> Result<Vec<CampaignSample>> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut samples = Vec::new();
        for row in reader.deserialize() {
            let sample: CampaignSample = row?;
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(RoiError::DataError(format!(
                "No campaigns found in {}",
                self.path.display()
            )));
        }

        debug!(path = %self.path.display(), rows = samples.len(), "loaded training csv");
        Ok(samples)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

/// Encoded training data together with the encoder that produced it
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub encoder: CategoryEncoder,
    pub samples: Vec<TrainingSample>,
}

impl TrainingSet {
    /// Fit the category encoder on the campaigns' ad approaches and encode
    /// every campaign through [`FeatureVector::from_record`], the same path
    /// inference uses.
    pub fn encode(campaigns: &[CampaignSample], order: CodeOrder) -> Result<Self> {
        let encoder = CategoryEncoder::fit(campaigns.iter().map(|c| &c.ad_approach), order)?;

        let samples = campaigns
            .iter()
            .map(|campaign| {
                Ok(TrainingSample {
                    features: FeatureVector::from_record(&campaign.to_record(), &encoder)?,
                    target: campaign.revenue,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { encoder, samples })
    }

    /// Number of encoded samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
