//! Spreadsheet workbook reading via calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use log::debug;

use super::LoadError;
use crate::table::{Cell, DataTable};

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::from_number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::from_text(s),
        other => Cell::from_text(&other.to_string()),
    }
}

fn header_name(data: &Data) -> String {
    match to_cell(data) {
        Cell::Missing => String::new(),
        cell => cell.label(),
    }
}

/// Converts a worksheet range into a table, using the first row as header.
pub fn range_to_table(range: &Range<Data>, sheet_name: &str) -> Result<DataTable, LoadError> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet(sheet_name.to_string()))?
        .iter()
        .map(header_name)
        .collect();

    let body: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(to_cell).collect())
        .collect();
    debug!(
        "Sheet '{}': {} header cells, {} data rows",
        sheet_name,
        header.len(),
        body.len()
    );

    Ok(DataTable::from_rows(header, body))
}

pub fn sheet_names(path: &Path) -> Result<Vec<String>, LoadError> {
    let workbook = open_workbook_auto(path).map_err(|source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(workbook.sheet_names())
}

/// Reads `sheet_name` from the workbook at `path`.
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<DataTable, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet_name) {
        return Err(LoadError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet_name.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|source| LoadError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
    range_to_table(&range, sheet_name)
}
