//! Ad cost estimation by channel and approach

use crate::error::{Result, RoiError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Advertising channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdChannel {
    #[serde(rename = "youtube")]
    YouTube,
    Newspaper,
    Ppc,
    /// Any other channel, priced at the flat base cost
    Other,
}

impl FromStr for AdChannel {
    type Err = RoiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(AdChannel::YouTube),
            "newspaper" => Ok(AdChannel::Newspaper),
            "ppc" => Ok(AdChannel::Ppc),
            "" => Err(RoiError::InvalidParameter(
                "Ad type must not be empty".to_string(),
            )),
            _ => Ok(AdChannel::Other),
        }
    }
}

/// Flat base cost for channels without their own pricing
const DEFAULT_BASE_COST: f64 = 1000.0;

/// Cost multiplier for an ad approach; unknown approaches cost the base price
pub fn approach_multiplier(approach: &str) -> f64 {
    match approach {
        "informative" => 1.0,
        "persuasive" => 1.1,
        "reminder" => 0.9,
        "comparative" => 1.2,
        "emotive" => 1.3,
        _ => 1.0,
    }
}

/// Base cost of a channel before the approach multiplier
pub fn base_cost(channel: AdChannel, location: &str, subscribers: u64) -> f64 {
    match channel {
        AdChannel::YouTube => match subscribers {
            s if s < 10_000 => 200.0,
            s if s < 100_000 => 800.0,
            s if s < 1_000_000 => 5000.0,
            _ => 20_000.0,
        },
        AdChannel::Newspaper => {
            if location.contains("India") {
                3000.0
            } else {
                5000.0
            }
        }
        AdChannel::Ppc => 2.0,
        AdChannel::Other => DEFAULT_BASE_COST,
    }
}

/// Estimated cost of placing an ad
pub fn estimate_ad_cost(channel: AdChannel, approach: &str, location: &str, subscribers: u64) -> f64 {
    base_cost(channel, location, subscribers) * approach_multiplier(approach)
}

/// Number of competitors in a comma-separated list.
///
/// Counts entries the way the list is written, so an empty string still
/// counts as one competitor.
pub fn competitor_count(competitors: &str) -> usize {
    competitors.split(',').count()
}
