//! In-memory tabular data as loaded from a spreadsheet.
//!
//! Rows are subjects and columns are named variables. Columns keep the order
//! in which they appear in the source sheet.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strings read as missing values, mirroring the usual spreadsheet NA markers.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),
}

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Builds a cell from raw text, mapping NA markers to `Missing`.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NA_TOKENS.contains(&trimmed) {
            Cell::Missing
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn from_number(value: f64) -> Self {
        if value.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric value of the cell, parsing text when it looks like a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => s.parse::<f64>().ok().filter(|v| v.is_finite()),
            Cell::Missing => None,
        }
    }

    /// Category label used for one-hot column names.
    pub fn label(&self) -> String {
        match self {
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "NA"),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Integral floats print without a fractional part (`2.0` -> `2`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Orders category labels: numeric labels first (ascending), then text.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Column-oriented table of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    columns: IndexMap<String, Vec<Cell>>,
    n_rows: usize,
}

impl DataTable {
    /// Builds a table from a header row and data rows.
    ///
    /// Empty header names become `Unnamed: <index>` and repeated names get a
    /// `.<n>` suffix. Short rows are padded with missing cells; cells beyond
    /// the header are dropped.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let names = normalize_header(header);
        let n_rows = rows.len();
        let mut columns: IndexMap<String, Vec<Cell>> = names
            .iter()
            .map(|name| (name.clone(), Vec::with_capacity(n_rows)))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for values in columns.values_mut() {
                values.push(cells.next().unwrap_or(Cell::Missing));
            }
        }

        DataTable { columns, n_rows }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// New table holding only `names`, in the given order.
    pub fn select(&self, names: &[String]) -> Result<DataTable, TableError> {
        let mut columns = IndexMap::with_capacity(names.len());
        for name in names {
            let values = self
                .columns
                .get(name)
                .ok_or_else(|| TableError::MissingColumn(name.clone()))?;
            columns.insert(name.clone(), values.clone());
        }
        Ok(DataTable {
            columns,
            n_rows: self.n_rows,
        })
    }

    /// Indices of rows with no missing cell in any column.
    pub fn complete_rows(&self) -> Vec<usize> {
        (0..self.n_rows)
            .filter(|&r| self.columns.values().all(|col| !col[r].is_missing()))
            .collect()
    }

    /// New table holding only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> DataTable {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let kept = rows.iter().map(|&r| values[r].clone()).collect();
                (name.clone(), kept)
            })
            .collect();
        DataTable {
            columns,
            n_rows: rows.len(),
        }
    }
}

fn normalize_header(header: Vec<String>) -> Vec<String> {
    // base name -> number of suffixed copies handed out so far
    let mut suffixes: IndexMap<String, usize> = IndexMap::new();
    let mut names: Vec<String> = Vec::with_capacity(header.len());

    for (idx, raw) in header.into_iter().enumerate() {
        let base = raw.trim();
        let base = if base.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            base.to_string()
        };

        let mut name = base.clone();
        if names.contains(&name) {
            let count = suffixes.entry(base.clone()).or_insert(0);
            loop {
                *count += 1;
                name = format!("{}.{}", base, count);
                if !names.contains(&name) {
                    break;
                }
            }
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::from_text(s)
    }

    #[test]
    fn test_new_table() {
        let table = DataTable::default();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 0);
    }

    #[test]
    fn test_na_tokens_are_missing() {
        for token in ["", "NA", "N/A", "nan", "NULL", "  ", "#N/A"] {
            assert!(text(token).is_missing(), "{:?} should be missing", token);
        }
        assert!(Cell::from_number(f64::NAN).is_missing());
        assert_eq!(text(" AG "), Cell::Text("AG".to_string()));
    }

    #[test]
    fn test_header_normalization() {
        let header = vec![
            "rs1".to_string(),
            "".to_string(),
            "rs1".to_string(),
            "rs1".to_string(),
        ];
        let table = DataTable::from_rows(header, vec![]);
        let names: Vec<_> = table.column_names().collect();
        assert_eq!(names, vec!["rs1", "Unnamed: 1", "rs1.1", "rs1.2"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = DataTable::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Number(1.0)], vec![Cell::Number(2.0), text("x")]],
        );
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("b").unwrap()[0], Cell::Missing);
        assert_eq!(table.complete_rows(), vec![1]);
    }

    #[test]
    fn test_select_and_take_rows() {
        let table = DataTable::from_rows(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![
                vec![Cell::Number(1.0), text("AA"), text("x")],
                vec![Cell::Number(2.0), text("AG"), Cell::Missing],
            ],
        );
        let selected = table.select(&["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(selected.column_names().collect::<Vec<_>>(), vec!["b", "a"]);

        let err = table.select(&["zzz".to_string()]).unwrap_err();
        assert_eq!(err, TableError::MissingColumn("zzz".to_string()));

        let taken = table.take_rows(&[1]);
        assert_eq!(taken.n_rows(), 1);
        assert_eq!(taken.column("a").unwrap()[0], Cell::Number(2.0));
    }

    #[test]
    fn test_labels_and_numeric_parsing() {
        assert_eq!(Cell::Number(2.0).label(), "2");
        assert_eq!(Cell::Number(2.5).label(), "2.5");
        assert_eq!(text("3").as_f64(), Some(3.0));
        assert_eq!(text("AG").as_f64(), None);
        assert_eq!(Cell::Bool(true).as_f64(), Some(1.0));
    }

    #[test]
    fn test_label_ordering() {
        let mut labels = vec!["GG", "10", "AA", "2", "AG"];
        labels.sort_by(|a, b| compare_labels(a, b));
        assert_eq!(labels, vec!["2", "10", "AA", "AG", "GG"]);
    }
}
