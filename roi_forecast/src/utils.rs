//! Utility functions for the roi_forecast crate

use crate::error::{Result, RoiError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split samples into shuffled training and test partitions.
///
/// The test partition holds `ceil(len * test_fraction)` samples. Both
/// partitions must end up non-empty, otherwise the split fails with
/// [`RoiError::InsufficientData`]; there is no fallback to training on
/// everything.
pub fn train_test_split<T: Clone>(
    samples: &[T],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(RoiError::InvalidParameter(format!(
            "Test fraction must be between 0 and 1, got {}",
            test_fraction
        )));
    }

    let test_size = (samples.len() as f64 * test_fraction).ceil() as usize;
    let train_size = samples.len().saturating_sub(test_size);

    if test_size == 0 || train_size == 0 {
        return Err(RoiError::InsufficientData(format!(
            "Cannot split {} samples into non-empty train and test partitions",
            samples.len()
        )));
    }

    let mut indices: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices[..test_size].iter().map(|&i| samples[i].clone()).collect();
    let train = indices[test_size..].iter().map(|&i| samples[i].clone()).collect();

    Ok((train, test))
}
