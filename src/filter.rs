//! Merging correlations with p-values and keeping the significant rows.

use log::info;
use serde::{Deserialize, Serialize};

use crate::encoding::IndicatorColumn;
use crate::stats::{adjust_pvalues_bh, AssociationTable};

/// One indicator column with its statistics for every behavioral code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub indicator: String,
    pub variant: String,
    pub category: String,
    pub correlations: Vec<f64>,
    pub p_values: Vec<f64>,
    pub adjusted_p_values: Vec<f64>,
}

impl CombinedRow {
    /// True when any p-value is below `threshold`. NaN never qualifies.
    pub fn is_significant(&self, threshold: f64) -> bool {
        self.p_values.iter().any(|&p| p < threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTable {
    pub codes: Vec<String>,
    pub rows: Vec<CombinedRow>,
}

impl CombinedTable {
    /// Joins correlation and p-value tables row by row.
    ///
    /// Both tables must be keyed by the same indicator columns, in the same
    /// order. Adjusted p-values are Benjamini-Hochberg per behavioral code.
    pub fn combine(
        columns: &[IndicatorColumn],
        correlations: &AssociationTable,
        p_values: &AssociationTable,
    ) -> Self {
        debug_assert_eq!(correlations.row_names, p_values.row_names);
        debug_assert_eq!(correlations.code_names, p_values.code_names);

        let adjusted: Vec<Vec<f64>> = p_values
            .values
            .columns()
            .into_iter()
            .map(|col| adjust_pvalues_bh(&col.to_vec()))
            .collect();

        let rows = columns
            .iter()
            .enumerate()
            .map(|(i, column)| CombinedRow {
                indicator: column.name.clone(),
                variant: column.variant.clone(),
                category: column.category.clone(),
                correlations: correlations.values.row(i).to_vec(),
                p_values: p_values.values.row(i).to_vec(),
                adjusted_p_values: adjusted.iter().map(|code| code[i]).collect(),
            })
            .collect();

        CombinedTable {
            codes: correlations.code_names.clone(),
            rows,
        }
    }

    /// Statistic headers in output order: for every code,
    /// `Correlation with X`, `P-value for X`, `Adjusted p-value for X`.
    pub fn headers(&self) -> Vec<String> {
        self.codes
            .iter()
            .flat_map(|code| {
                [
                    format!("Correlation with {}", code),
                    format!("P-value for {}", code),
                    format!("Adjusted p-value for {}", code),
                ]
            })
            .collect()
    }

    /// Rows where at least one behavioral code has `p < threshold`.
    pub fn filter_significant(&self, threshold: f64) -> CombinedTable {
        let rows: Vec<CombinedRow> = self
            .rows
            .iter()
            .filter(|row| row.is_significant(threshold))
            .cloned()
            .collect();
        info!(
            "{} of {} indicator columns significant at p < {}",
            rows.len(),
            self.rows.len(),
            threshold
        );
        CombinedTable {
            codes: self.codes.clone(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
