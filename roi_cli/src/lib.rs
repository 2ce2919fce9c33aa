//! Argument handling for the `adroi` binary.
//!
//! Every command returns the JSON it would print, so the binary only adds
//! logging setup and the exit code.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roi_forecast::cost::{competitor_count, estimate_ad_cost, AdChannel};
use roi_forecast::{
    CampaignRecord, CsvTrainingSource, ModelArtifact, ReferenceDataset, RevenuePredictor,
    TrainingConfig, TrainingSource,
};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "ADROI_LOG";

static INIT: Once = Once::new();

/// Ad revenue and ROI forecasting
#[derive(Debug, Parser)]
#[command(name = "adroi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Predict revenue and ROI for a campaign
    ///
    /// Examples:
    ///   adroi predict
    ///   adroi predict '{"adCost": 1500, "factors": {...}, "adApproach": "emotive"}'
    ///   adroi predict --model model.json - < campaign.json
    Predict {
        /// Campaign record as JSON, or `-` to read stdin (default campaign if omitted)
        #[arg(value_name = "INPUT_JSON")]
        input: Option<String>,

        /// Saved model artifact (trains in-process if omitted)
        #[arg(short, long)]
        model: Option<PathBuf>,

        #[command(flatten)]
        training: TrainingArgs,
    },
    /// Train a model and write it as an artifact
    Train {
        /// Artifact path to write
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        training: TrainingArgs,
    },
    /// Estimate the cost of placing an ad
    EstimateCost {
        /// Channel: youtube, newspaper, ppc or any other name
        #[arg(long)]
        ad_type: String,

        /// Ad approach, e.g. informative or emotive
        #[arg(long)]
        approach: String,

        /// Market location
        #[arg(long, default_value = "")]
        location: String,

        /// Channel subscribers (YouTube pricing tiers)
        #[arg(long, default_value = "0")]
        subscribers: u64,

        /// Comma-separated competitor list
        #[arg(long)]
        competitors: Option<String>,
    },
}

/// Flags shared by commands that fit a model
#[derive(Debug, Clone, clap::Args)]
pub struct TrainingArgs {
    /// Training CSV (reference campaigns if omitted)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Number of trees
    #[arg(short, long)]
    pub trees: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl TrainingArgs {
    /// Default config with the given flags applied
    pub fn config(&self) -> TrainingConfig {
        let mut config = TrainingConfig::default();
        if let Some(trees) = self.trees {
            config = config.with_tree_count(trees);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn source(&self) -> Box<dyn TrainingSource> {
        match &self.data {
            Some(path) => Box::new(CsvTrainingSource::new(path)),
            None => Box::new(ReferenceDataset),
        }
    }

    /// Train a predictor from the selected source
    pub fn train(&self) -> Result<RevenuePredictor> {
        let source = self.source();
        RevenuePredictor::train(source.as_ref(), &self.config())
            .with_context(|| format!("Failed to train on {}", source.describe()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CostEstimate {
    ad_type: AdChannel,
    approach: String,
    estimated_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    competitor_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainSummary {
    output: PathBuf,
    trees: usize,
    categories: Vec<String>,
    train_samples: Option<usize>,
    test_samples: Option<usize>,
    test_rmse: Option<f64>,
}

/// Set up logging to stderr, filtered by `ADROI_LOG` (default `warn`).
///
/// Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    });
}

/// Execute a command and return its JSON output
pub fn run(cli: Cli) -> Result<String> {
    match cli.command {
        Commands::Predict {
            input,
            model,
            training,
        } => predict(input.as_deref(), model.as_deref(), &training),
        Commands::Train { output, training } => train(&output, &training),
        Commands::EstimateCost {
            ad_type,
            approach,
            location,
            subscribers,
            competitors,
        } => estimate_cost(
            &ad_type,
            &approach,
            &location,
            subscribers,
            competitors.as_deref(),
        ),
    }
}

/// Parse the campaign argument; `None` is the default campaign
pub fn read_record(input: Option<&str>) -> Result<CampaignRecord> {
    match input {
        None => Ok(CampaignRecord::default()),
        Some("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read campaign from stdin")?;
            CampaignRecord::from_json(&buffer).context("Invalid campaign JSON")
        }
        Some(json) => CampaignRecord::from_json(json).context("Invalid campaign JSON"),
    }
}

fn predict(input: Option<&str>, model: Option<&Path>, training: &TrainingArgs) -> Result<String> {
    let record = read_record(input)?;

    let predictor = match model {
        Some(path) => ModelArtifact::load(path)
            .and_then(ModelArtifact::into_predictor)
            .with_context(|| format!("Failed to load model from {}", path.display()))?,
        None => training.train()?,
    };

    let result = predictor.predict(&record)?;
    Ok(result.to_json()?)
}

fn train(output: &Path, training: &TrainingArgs) -> Result<String> {
    let predictor = training.train()?;
    ModelArtifact::from_predictor(&predictor)
        .save(output)
        .with_context(|| format!("Failed to write model to {}", output.display()))?;
    info!(path = %output.display(), "model written");

    let report = predictor.report();
    let summary = TrainSummary {
        output: output.to_path_buf(),
        trees: predictor.model().trees().len(),
        categories: predictor.encoder().labels().to_vec(),
        train_samples: report.map(|r| r.train_samples),
        test_samples: report.map(|r| r.test_samples),
        test_rmse: report.map(|r| r.test_metrics.rmse),
    };
    Ok(serde_json::to_string(&summary)?)
}

fn estimate_cost(
    ad_type: &str,
    approach: &str,
    location: &str,
    subscribers: u64,
    competitors: Option<&str>,
) -> Result<String> {
    let channel: AdChannel = ad_type.parse()?;
    let estimate = CostEstimate {
        ad_type: channel,
        approach: approach.to_string(),
        estimated_cost: estimate_ad_cost(channel, approach, location, subscribers),
        competitor_count: competitors.map(competitor_count),
    };
    Ok(serde_json::to_string(&estimate)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_args_override_defaults() {
        let cli = Cli::parse_from(["adroi", "train", "--output", "m.json", "--trees", "7"]);
        match cli.command {
            Commands::Train { output, training } => {
                assert_eq!(output, PathBuf::from("m.json"));
                let config = training.config();
                assert_eq!(config.tree_count, 7);
                assert_eq!(config.seed, 42);
            }
            other => panic!("Expected train command, got {:?}", other),
        }
    }

    #[test]
    fn test_predict_without_input() {
        let cli = Cli::parse_from(["adroi", "predict"]);
        assert!(matches!(
            cli.command,
            Commands::Predict {
                input: None,
                model: None,
                ..
            }
        ));
    }

    #[test]
    fn test_read_default_record() {
        assert_eq!(read_record(None).unwrap(), CampaignRecord::default());
        assert!(read_record(Some("{not json")).is_err());
    }

    #[test]
    fn test_estimate_cost_output() {
        let json = estimate_cost("YouTube", "emotive", "", 50_000, Some("a,b,c")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["adType"], "youtube");
        assert!((value["estimatedCost"].as_f64().unwrap() - 1040.0).abs() < 1e-9);
        assert_eq!(value["competitorCount"], 3);
    }

    #[test]
    fn test_empty_ad_type_is_rejected() {
        assert!(estimate_cost("  ", "emotive", "", 0, None).is_err());
    }
}
