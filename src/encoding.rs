//! One-hot encoding of genotype columns.
//!
//! Each variant column `rsX` becomes one 0/1 indicator column per distinct
//! genotype observed in the cleaned rows, named `rsX_<genotype>`.

use log::{debug, info};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::preprocess::CleanedDataset;
use crate::table::compare_labels;

/// Describes one indicator column and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub variant: String,
    pub category: String,
}

impl IndicatorColumn {
    fn new(variant: &str, category: &str) -> Self {
        IndicatorColumn {
            name: format!("{}_{}", variant, category),
            variant: variant.to_string(),
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodedDataset {
    pub columns: Vec<IndicatorColumn>,
    /// rows x indicator columns, values 0.0 / 1.0
    pub indicators: Array2<f64>,
}

impl EncodedDataset {
    pub fn n_indicators(&self) -> usize {
        self.columns.len()
    }

    pub fn indicator(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.indicators.column(idx)
    }

    /// Column indices of the indicators derived from `variant`.
    pub fn indicators_of<'a>(&'a self, variant: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.variant == variant)
            .map(|(i, _)| i)
    }
}

/// Distinct categories of a column, numeric labels first then text.
pub fn categories(labels: &[String]) -> Vec<String> {
    let mut cats = labels.to_vec();
    cats.sort_by(|a, b| compare_labels(a, b));
    cats.dedup();
    cats
}

pub fn one_hot_encode(cleaned: &CleanedDataset) -> EncodedDataset {
    let n_rows = cleaned.n_rows();
    let mut columns = Vec::new();
    let mut values: Vec<Vec<f64>> = Vec::new();

    for variant in cleaned.variant_columns() {
        let labels = cleaned.variant_labels(variant).unwrap_or_default();
        let cats = categories(&labels);
        debug!("{}: {} categories {:?}", variant, cats.len(), cats);

        for cat in &cats {
            columns.push(IndicatorColumn::new(variant, cat));
            values.push(
                labels
                    .iter()
                    .map(|l| if l == cat { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }

    let mut indicators = Array2::<f64>::zeros((n_rows, columns.len()));
    for (j, col) in values.iter().enumerate() {
        for (i, &v) in col.iter().enumerate() {
            indicators[[i, j]] = v;
        }
    }

    info!(
        "Encoded {} variant columns into {} indicator columns",
        cleaned.variant_columns().len(),
        columns.len()
    );
    EncodedDataset {
        columns,
        indicators,
    }
}
