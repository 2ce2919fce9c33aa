//! Persisted model artifacts
//!
//! An artifact carries the feature schema and the category encoder next to
//! the fitted forest, so a model trained against a different schema is
//! rejected when it is loaded rather than silently mispredicting later.

use crate::encoder::CategoryEncoder;
use crate::error::{Result, RoiError};
use crate::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::models::TrainedRandomForest;
use crate::predictor::{RevenuePredictor, TrainingReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Current artifact format
pub const FORMAT_VERSION: u32 = 1;

/// Serialized predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_schema: Vec<String>,
    pub encoder: CategoryEncoder,
    pub model: TrainedRandomForest,
    pub report: Option<TrainingReport>,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Capture a predictor for persistence
    pub fn from_predictor(predictor: &RevenuePredictor) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_schema: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            encoder: predictor.encoder().clone(),
            model: predictor.model().clone(),
            report: predictor.report().cloned(),
            trained_at: Utc::now(),
        }
    }

    /// Check the artifact against the compiled feature schema
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(RoiError::SchemaMismatch(format!(
                "Unsupported artifact format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        if self.feature_schema.len() != FEATURE_COUNT {
            return Err(RoiError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: self.feature_schema.len(),
            });
        }
        for (position, (stored, expected)) in
            self.feature_schema.iter().zip(FEATURE_NAMES).enumerate()
        {
            if stored != expected {
                return Err(RoiError::SchemaMismatch(format!(
                    "Feature {} is '{}' in the artifact but '{}' in this build",
                    position, stored, expected
                )));
            }
        }
        if self.encoder.is_empty() {
            return Err(RoiError::SchemaMismatch(
                "Artifact has an empty category encoder".to_string(),
            ));
        }
        self.model.validate()
    }

    /// Write the artifact as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;

        info!(path = %path.as_ref().display(), "saved model artifact");
        Ok(())
    }

    /// Read and validate an artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        artifact.validate()?;

        info!(
            path = %path.as_ref().display(),
            trees = artifact.model.trees().len(),
            trained_at = %artifact.trained_at,
            "loaded model artifact"
        );
        Ok(artifact)
    }

    /// Rebuild the predictor
    pub fn into_predictor(self) -> Result<RevenuePredictor> {
        self.validate()?;

        let predictor = RevenuePredictor::new(self.encoder, self.model);
        Ok(match self.report {
            Some(report) => predictor.with_report(report),
            None => predictor,
        })
    }
}
