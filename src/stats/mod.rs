//! Statistical analysis module.
//!
//! Pearson correlation, its t-distribution significance test, and
//! Benjamini-Hochberg multiple-testing adjustment.

pub mod association;

pub use association::{correlation_table, p_value_table, AssociationTable};

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Fewest paired observations for which a p-value is reported.
pub const MIN_OBSERVATIONS: usize = 3;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Columns have different lengths ({0} vs {1})")]
    LengthMismatch(usize, usize),

    #[error("Invalid t distribution with {0} degrees of freedom: {1}")]
    Distribution(f64, String),
}

/// Result of a Pearson correlation test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PearsonTest {
    pub r: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Pearson product-moment correlation.
///
/// NaN when fewer than two observations or either column has zero variance.
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<f64, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch(x.len(), y.len()));
    }
    let n = x.len();
    if n < 2 {
        return Ok(f64::NAN);
    }

    let mean_x = x.sum() / n as f64;
    let mean_y = y.sum() / n as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Ok(f64::NAN);
    }
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Two-sided p-value for a correlation `r` over `n` observations.
///
/// Uses `t = r * sqrt((n - 2) / (1 - r^2))` with `n - 2` degrees of freedom.
pub fn correlation_p_value(r: f64, n: usize) -> Result<f64, StatsError> {
    if r.is_nan() || n < MIN_OBSERVATIONS {
        return Ok(f64::NAN);
    }
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        return Ok(0.0);
    }

    let t = r * (df / denom).sqrt();
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(df, e.to_string()))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

pub fn pearson_test(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<PearsonTest, StatsError> {
    let r = pearson(x, y)?;
    let p_value = correlation_p_value(r, x.len())?;
    Ok(PearsonTest {
        r,
        p_value,
        n: x.len(),
    })
}

/// Adjusts p-values for multiple testing using the Benjamini-Hochberg method.
///
/// NaN p-values are not counted as tests and stay NaN.
pub fn adjust_pvalues_bh(p_values: &[f64]) -> Vec<f64> {
    let mut adjusted = vec![f64::NAN; p_values.len()];

    // Sort by p-value, keeping track of original indices
    let mut indexed: Vec<(usize, f64)> = p_values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let m = indexed.len();
    let mut last_padj = 1.0;

    // Walk from the largest p-value down so the adjusted values stay monotone
    for (rank, &(original_index, p_value)) in indexed.iter().enumerate().rev() {
        let padj = p_value * m as f64 / (rank + 1) as f64;
        let current = padj.min(last_padj).min(1.0);
        adjusted[original_index] = current;
        last_padj = current;
    }

    adjusted
}
