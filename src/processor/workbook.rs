//! Workbook and CSV loading
//!
//! Converts spreadsheet files into [`Sheet`]s: the first row becomes the
//! column names, the remaining non-blank rows become typed cells.

use crate::constants::ADMIN_SHEET_PATTERN;
use crate::error::{PcodeError, Result};
use crate::models::{CellValue, Sheet};
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static ADMIN_SHEET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ADMIN_SHEET_PATTERN).expect("admin sheet regex"));

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether a sheet name follows the admin level tab convention
pub fn is_admin_sheet(name: &str) -> bool {
    ADMIN_SHEET_RE.is_match(name)
}

/// Whether a path looks like a spreadsheet calamine can open
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()))
}

/// Load the admin level tabs of a workbook, in workbook order
///
/// Tabs that do not look like admin levels (metadata, notes, admin 0) are
/// left out. An empty result means the workbook has no admin tabs.
pub fn load_admin_sheets(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path).map_err(|source| PcodeError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();
    for name in sheet_names.iter().filter(|name| is_admin_sheet(name)) {
        let range = workbook
            .worksheet_range(name)
            .map_err(|source| PcodeError::Workbook {
                path: path.to_path_buf(),
                source,
            })?;
        sheets.push(range_to_sheet(name, &range));
    }

    debug!(
        "Loaded {} of {} sheets from {}",
        sheets.len(),
        sheet_names.len(),
        path.display()
    );
    Ok(sheets)
}

/// Load a single table: the first sheet of a workbook, or a CSV file
pub fn load_table(path: &Path) -> Result<Sheet> {
    if !is_workbook(path) {
        return load_csv_sheet(path);
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| PcodeError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PcodeError::DatasetNotFound {
            path: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&first)
        .map_err(|source| PcodeError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(range_to_sheet(&first, &range))
}

/// Read a CSV file with a header row; every cell is text
pub fn load_csv_sheet(path: &Path) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        if row.iter().any(|cell| !cell.is_missing()) {
            rows.push(row);
        }
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(Sheet::new(name, columns, rows))
}

/// Convert a calamine range into a sheet; the first row is the header
pub fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();

    let columns: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| cell_from_data(cell).to_text().trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_missing()))
        .collect();

    Sheet::new(name, columns, rows)
}

/// Map a calamine cell onto [`CellValue`]
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if !dt.is_duration() => match dt.as_datetime() {
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
