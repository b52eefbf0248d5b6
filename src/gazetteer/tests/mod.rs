//! Tests for the gazetteer engine
//!
//! Sheets are built in memory; no workbook files are involved.

pub mod row_tests;

use crate::models::{CellValue, Sheet};

/// Build a sheet from string cells; empty strings become empty cells
pub(crate) fn text_sheet(name: &str, columns: &[&str], rows: &[&[&str]]) -> Sheet {
    Sheet::new(
        name,
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::from(*cell)
                        }
                    })
                    .collect()
            })
            .collect(),
    )
}

pub(crate) fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|c| c.to_string()).collect()
}
