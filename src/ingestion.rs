//! Reading uploaded transaction exports into a [`RawTable`].
//!
//! The reader does not judge the shape of the data. Ragged rows, odd
//! headers and unparseable cells are all passed through so that
//! [`crate::validation::validate_table`] reports them with the right error.

use crate::error::Result;
use crate::schema::{RawTable, RawValue};
use log::debug;
use std::io::Read;
use std::path::Path;

pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(raw_cell).collect());
    }

    debug!(
        "Read CSV with {} columns and {} data rows",
        columns.len(),
        rows.len()
    );

    Ok(RawTable::new(columns, rows))
}

pub fn read_csv_path(path: impl AsRef<Path>) -> Result<RawTable> {
    let file = std::fs::File::open(path.as_ref())?;
    read_csv(file)
}

fn raw_cell(field: &str) -> RawValue {
    if field.trim().is_empty() {
        RawValue::Empty
    } else {
        RawValue::Text(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_basic() {
        let data = "date,description,category,value\n\
                    2026-01-15,Grocery Store,Groceries,$-120.50\n\
                    2026-01-30,Monthly Salary,Salary,$3000.00\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(
            table.columns,
            vec!["date", "description", "category", "value"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 3), &RawValue::Text("$-120.50".to_string()));
    }

    #[test]
    fn test_read_csv_trims_headers_and_bom() {
        let data = "\u{feff}date, description ,category,value\n2026-01-15,A,B,1\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.columns[0], "date");
        assert_eq!(table.columns[1], "description");
    }

    #[test]
    fn test_read_csv_keeps_ragged_rows_and_empty_cells() {
        let data = "date,description,category,value\n2026-01-15,Coffee\n2026-01-16,,Dining,-4\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.cell(0, 3), &RawValue::Empty);
        assert_eq!(table.cell(1, 1), &RawValue::Empty);
    }

    #[test]
    fn test_read_csv_skips_blank_lines() {
        let data = "date,description,category,value\n,,,\n2026-01-15,A,B,1\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_read_csv_path_missing_file() {
        let err = read_csv_path("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
