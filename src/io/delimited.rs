//! Delimited text (CSV / TSV) input.

use std::path::Path;

use csv::ReaderBuilder;

use super::LoadError;
use crate::table::{Cell, DataTable};

/// Reads a delimited file with a header row. Every value is read as text;
/// numeric columns are parsed on demand by the preprocessor.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<DataTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(DataTable::from_rows(header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subjects.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Strees profile,rs1,rs2\n1,AA,CT\n2,AG,NA\n3,,CC").unwrap();

        let table = read_delimited(&path, b',').unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column("Strees profile").unwrap()[0].as_f64(), Some(1.0));
        assert!(table.column("rs2").unwrap()[1].is_missing());
        assert!(table.column("rs1").unwrap()[2].is_missing());
        assert_eq!(table.complete_rows(), vec![0]);
    }

    #[test]
    fn test_read_tsv_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subjects.tsv");
        std::fs::write(&path, "a\tb\n1\n2\tx\n").unwrap();

        let table = read_delimited(&path, b'\t').unwrap();
        assert_eq!(table.n_rows(), 2);
        assert!(table.column("b").unwrap()[0].is_missing());
    }
}
