//! Input/Output operations module.
//!
//! Handles reading the subject table (spreadsheet workbooks or delimited
//! text) and writing results (the significant-correlation table and the run
//! summary).

pub mod delimited;
pub mod workbook;

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::filter::CombinedTable;
use crate::table::DataTable;

/// Failures while opening or reading the input table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Sheet '{sheet}' not found in {path} (available: {available:?})")]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Delimited(u8),
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)?;
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods" => {
                Some(InputFormat::Workbook)
            }
            "csv" => Some(InputFormat::Delimited(b',')),
            "tsv" | "tab" => Some(InputFormat::Delimited(b'\t')),
            _ => None,
        }
    }
}

/// Loads one sheet of `path` into a [`DataTable`].
///
/// For delimited files the sheet name is ignored.
pub fn load_table(path: impl AsRef<Path>, sheet_name: &str) -> Result<DataTable, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let format = InputFormat::from_path(path)
        .ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let table = match format {
        InputFormat::Workbook => workbook::read_sheet(path, sheet_name)?,
        InputFormat::Delimited(delimiter) => delimited::read_delimited(path, delimiter)?,
    };

    info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Sheet names of a workbook; a delimited file reports no sheets.
pub fn list_sheets(path: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    match InputFormat::from_path(path) {
        Some(InputFormat::Workbook) => workbook::sheet_names(path),
        Some(InputFormat::Delimited(_)) => Ok(Vec::new()),
        None => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else {
        value.to_string()
    }
}

/// Writes the combined correlation / p-value table to a CSV file.
///
/// Columns: `indicator`, `variant`, `category`, then for every behavioral code
/// `Correlation with X`, `P-value for X`, `Adjusted p-value for X`.
pub fn write_combined_table(table: &CombinedTable, output_path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(output_path.as_ref())?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    let mut header = vec![
        "indicator".to_string(),
        "variant".to_string(),
        "category".to_string(),
    ];
    header.extend(table.headers());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.indicator.clone());
        record.push(row.variant.clone());
        record.push(row.category.clone());
        for i in 0..table.codes.len() {
            record.push(format_value(row.correlations[i]));
            record.push(format_value(row.p_values[i]));
            record.push(format_value(row.adjusted_p_values[i]));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Serializes any summary structure as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, output_path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(output_path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
