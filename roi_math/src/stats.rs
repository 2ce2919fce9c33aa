//! Descriptive statistics for regression-tree impurity
//!
//! Contains the building blocks the CART split search relies on:
//! - Mean
//! - Population variance (the MSE impurity of a node)
//! - Running moments and the weighted impurity decrease of a binary split

use crate::{MathError, Result};

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance, i.e. the mean squared deviation from the mean.
///
/// This is the MSE impurity of a regression node whose prediction is the
/// mean of its targets.
pub fn variance(values: &[f64]) -> Result<f64> {
    let mean = mean(values)?;
    let sum_squared_diff: f64 = values.iter().map(|&v| (v - mean).powi(2)).sum();

    Ok(sum_squared_diff / values.len() as f64)
}

/// Count, sum and sum of squares of a set of targets.
///
/// Lets a split search sweep thresholds in sorted order and price every
/// candidate in constant time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    /// Moments of an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Moments of every value in a slice
    pub fn from_values(values: &[f64]) -> Self {
        let mut moments = Self::new();
        for &value in values {
            moments.push(value);
        }
        moments
    }

    /// Add one value
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Number of values seen
    pub fn count(&self) -> usize {
        self.count
    }

    /// Moments of the values in `self` that are not in `subset`
    pub fn without(&self, subset: &Moments) -> Result<Moments> {
        if subset.count > self.count {
            return Err(MathError::InvalidInput(format!(
                "Subset of {} values is larger than its set of {}",
                subset.count, self.count
            )));
        }

        Ok(Moments {
            count: self.count - subset.count,
            sum: self.sum - subset.sum,
            sum_sq: self.sum_sq - subset.sum_sq,
        })
    }

    /// Sum of squared deviations from the mean, i.e. `n * var`
    pub fn squared_error(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_sq - self.sum * self.sum / self.count as f64).max(0.0)
    }
}

/// Impurity decrease of splitting `parent` so that `left` goes one way and
/// the remainder the other, weighted by the samples reaching the parent.
///
/// Returns `n_parent * var(parent) - n_left * var(left) - n_right * var(right)`,
/// which is the quantity summed per feature for mean-decrease-in-impurity
/// importances. Both sides must be non-empty.
pub fn weighted_impurity_decrease(parent: &Moments, left: &Moments) -> Result<f64> {
    if left.count == 0 || left.count >= parent.count {
        return Err(MathError::InvalidInput(format!(
            "Both sides of a split must contain at least one sample ({} of {} went left)",
            left.count, parent.count
        )));
    }

    let right = parent.without(left)?;

    // Cancellation can leave a tiny negative residue on a split that changes nothing
    Ok((parent.squared_error() - left.squared_error() - right.squared_error()).max(0.0))
}
