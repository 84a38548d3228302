//! Column selection and missing-value cleaning.

use log::{info, warn};
use ndarray::{Array1, Array2, ArrayView1};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::table::{compare_labels, DataTable, TableError};

#[derive(Error, Debug, PartialEq)]
pub enum PreprocessError {
    #[error("Required behavioral column '{0}' not found in input")]
    MissingColumn(String),

    #[error("Behavioral column '{column}' has non-numeric value '{value}' at data row {row}")]
    NonNumericCode {
        column: String,
        row: usize,
        value: String,
    },
}

impl From<TableError> for PreprocessError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingColumn(name) => PreprocessError::MissingColumn(name),
        }
    }
}

/// Subjects with a value for every behavioral code and every variant column.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    table: DataTable,
    code_columns: Vec<String>,
    variant_columns: Vec<String>,
    /// rows x behavioral codes
    codes: Array2<f64>,
    /// Data-row index in the source table for each kept row.
    source_rows: Vec<usize>,
    n_source_rows: usize,
}

impl CleanedDataset {
    pub fn n_rows(&self) -> usize {
        self.table.n_rows()
    }

    #[cfg(test)]
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn code_columns(&self) -> &[String] {
        &self.code_columns
    }

    pub fn variant_columns(&self) -> &[String] {
        &self.variant_columns
    }

    pub fn code(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.codes.column(idx)
    }

    /// Data-row indices of the source table that were dropped as incomplete.
    pub fn dropped_rows(&self) -> Vec<usize> {
        let mut kept = self.source_rows.iter().peekable();
        (0..self.n_source_rows)
            .filter(|row| {
                if kept.peek() == Some(&row) {
                    kept.next();
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Category label of every row for a variant column.
    pub fn variant_labels(&self, variant: &str) -> Option<Vec<String>> {
        self.table
            .column(variant)
            .map(|cells| cells.iter().map(|c| c.label()).collect())
    }

    /// Variant column read as numbers.
    ///
    /// Columns whose values are all numeric are used as is; otherwise each
    /// category is replaced by its rank among the sorted distinct categories.
    pub fn variant_as_numeric(&self, variant: &str) -> Option<Array1<f64>> {
        let cells = self.table.column(variant)?;
        let numeric: Option<Vec<f64>> = cells.iter().map(|c| c.as_f64()).collect();
        if let Some(values) = numeric {
            return Some(Array1::from(values));
        }

        let labels: Vec<String> = cells.iter().map(|c| c.label()).collect();
        let mut categories = labels.clone();
        categories.sort_by(|a, b| compare_labels(a, b));
        categories.dedup();
        Some(
            labels
                .iter()
                .map(|label| {
                    categories
                        .iter()
                        .position(|c| c == label)
                        .map_or(f64::NAN, |p| p as f64)
                })
                .collect(),
        )
    }
}

/// Selects the behavioral and variant columns and drops incomplete rows.
pub fn preprocess(table: &DataTable, config: &AnalysisConfig) -> Result<CleanedDataset, PreprocessError> {
    for code in &config.behavioral_codes {
        if !table.has_column(code) {
            return Err(PreprocessError::MissingColumn(code.clone()));
        }
    }

    let variant_columns: Vec<String> = table
        .column_names()
        .filter(|name| config.is_variant_column(name))
        .filter(|name| !config.behavioral_codes.iter().any(|c| c == name))
        .map(str::to_string)
        .collect();
    if variant_columns.is_empty() {
        warn!(
            "No columns start with the variant prefix '{}'",
            config.variant_prefix
        );
    }

    let mut selected = config.behavioral_codes.clone();
    selected.extend(variant_columns.iter().cloned());
    let selected = table.select(&selected)?;

    let source_rows = selected.complete_rows();
    let cleaned = selected.take_rows(&source_rows);
    let dropped = table.n_rows() - cleaned.n_rows();
    if cleaned.n_rows() == 0 {
        warn!("No rows left after dropping missing values");
    }

    let n_codes = config.behavioral_codes.len();
    let mut codes = Array2::<f64>::zeros((cleaned.n_rows(), n_codes));
    for (j, code) in config.behavioral_codes.iter().enumerate() {
        let cells = cleaned
            .column(code)
            .ok_or_else(|| PreprocessError::MissingColumn(code.clone()))?;
        for (i, cell) in cells.iter().enumerate() {
            codes[[i, j]] = cell.as_f64().ok_or_else(|| PreprocessError::NonNumericCode {
                column: code.clone(),
                row: source_rows[i],
                value: cell.to_string(),
            })?;
        }
    }

    info!(
        "Preprocessed: {} behavioral codes, {} variant columns, {} rows kept ({} dropped)",
        n_codes,
        variant_columns.len(),
        cleaned.n_rows(),
        dropped
    );

    Ok(CleanedDataset {
        table: cleaned,
        code_columns: config.behavioral_codes.clone(),
        variant_columns,
        codes,
        source_rows,
        n_source_rows: table.n_rows(),
    })
}
