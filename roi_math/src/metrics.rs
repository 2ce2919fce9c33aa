//! Accuracy metrics for evaluating a regression model on held-out samples

use crate::stats::mean;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Regression accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination. `None` when the actual values are
    /// constant, which leaves R² undefined.
    pub r_squared: Option<f64>,
}

/// Compare predictions against actual values
pub fn evaluate_regression(predicted: &[f64], actual: &[f64]) -> Result<RegressionMetrics> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(MathError::InvalidInput(
            "Predicted and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = predicted.len() as f64;

    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual.iter())
        .map(|(&p, &a)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let actual_mean = mean(actual)?;
    let total_sum_squares: f64 = actual.iter().map(|&a| (a - actual_mean).powi(2)).sum();
    let residual_sum_squares: f64 = errors.iter().map(|e| e.powi(2)).sum();

    let r_squared = if total_sum_squares > 0.0 {
        Some(1.0 - residual_sum_squares / total_sum_squares)
    } else {
        None
    };

    Ok(RegressionMetrics {
        mae,
        mse,
        rmse,
        r_squared,
    })
}

impl std::fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Regression Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        match self.r_squared {
            Some(r2) => writeln!(f, "  R²:    {:.4}", r2)?,
            None => writeln!(f, "  R²:    undefined")?,
        }
        Ok(())
    }
}
