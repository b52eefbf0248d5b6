//! Row validation and normalization
//!
//! Turns one classified spreadsheet row into a [`PCode`], or reports why
//! the row was skipped. Skips are expected (template rows, blank codes,
//! unnamed units) and are never errors.

use super::header::ClassifiedColumns;
use crate::constants::{COMMENT_MARKER, DATE_FORMAT, EXCEL_1900_LEAP_BUG_SERIAL, PLACEHOLDER_CODES};
use crate::models::{AdminLevel, CellValue, PCode, Sheet};
use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Everything resolved about a sheet before its rows are read
#[derive(Debug, Clone)]
pub struct SheetContext {
    pub country: String,
    pub level: AdminLevel,
    pub parent_level: Option<AdminLevel>,
    pub columns: ClassifiedColumns,
}

/// Why a row produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSkip {
    /// Template or commented-out row
    CommentMarker,
    /// Empty, `-`, `None` or `not reported` code
    PlaceholderCode,
    /// No name value
    MissingName,
}

/// A date cell, classified once per row
#[derive(Debug, Clone, PartialEq)]
pub enum DateKind {
    Calendar(NaiveDate),
    /// Day count in the 1900 spreadsheet date system
    LegacyEpochOffset(i64),
    /// Anything else, emitted exactly as found
    Unparsed(String),
}

impl DateKind {
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::DateTime(dt) => DateKind::Calendar(dt.date()),
            CellValue::Int(serial) => DateKind::LegacyEpochOffset(*serial),
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                DateKind::LegacyEpochOffset(*f as i64)
            }
            CellValue::Text(s) => parse_iso_date(s.trim())
                .map(DateKind::Calendar)
                .unwrap_or_else(|| DateKind::Unparsed(s.clone())),
            other => DateKind::Unparsed(other.to_text()),
        }
    }

    /// `YYYY-MM-DD` where the value is a date, otherwise the raw value
    pub fn render(&self) -> String {
        match self {
            DateKind::Calendar(date) => date.format(DATE_FORMAT).to_string(),
            DateKind::LegacyEpochOffset(serial) => match excel_serial_to_date(*serial) {
                Some(date) => date.format(DATE_FORMAT).to_string(),
                None => serial.to_string(),
            },
            DateKind::Unparsed(raw) => raw.clone(),
        }
    }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Convert a 1900-system serial day number to a calendar date
///
/// Serials from 61 on are shifted by the fictitious 1900-02-29. Negative
/// serials have no date.
pub fn excel_serial_to_date(serial: i64) -> Option<NaiveDate> {
    let days = u64::try_from(serial).ok()?;
    let epoch = if serial < EXCEL_1900_LEAP_BUG_SERIAL {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}

/// Whether a code value means "no code"
pub fn is_placeholder_code(code: &str) -> bool {
    let code = code.trim().to_lowercase();
    PLACEHOLDER_CODES.contains(&code.as_str())
}

/// Transliterate to ASCII and title-case single-case names
///
/// `"YAOUNDÉ"` becomes `"Yaounde"`, `"Mfoundi"` is left alone. Applying
/// this twice gives the same result as applying it once.
pub fn normalize_name(raw: &str) -> String {
    let ascii: String = raw.nfkd().filter(char::is_ascii).collect();
    if is_single_case(&ascii) {
        title_case(&ascii)
    } else {
        ascii
    }
}

/// True when the string has letters and they are all upper or all lower case
fn is_single_case(s: &str) -> bool {
    let mut letters = s.chars().filter(char::is_ascii_alphabetic).peekable();
    if letters.peek().is_none() {
        return false;
    }
    let (upper, lower): (Vec<char>, Vec<char>) = letters.partition(char::is_ascii_uppercase);
    upper.is_empty() || lower.is_empty()
}

/// Upper-case the first letter of every run of letters, lower-case the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Build a record from one row, or say why the row is skipped
pub fn normalize_row(
    row: &[CellValue],
    context: &SheetContext,
    reference_date: &str,
) -> Result<PCode, RowSkip> {
    let columns = &context.columns;

    let code = Sheet::cell(row, columns.code.index).to_text();
    if code.contains(COMMENT_MARKER) {
        return Err(RowSkip::CommentMarker);
    }
    if is_placeholder_code(&code) {
        return Err(RowSkip::PlaceholderCode);
    }

    let name_cell = Sheet::cell(row, columns.name.index);
    if name_cell.is_missing() {
        return Err(RowSkip::MissingName);
    }
    let name = normalize_name(&name_cell.to_text());

    let valid_from_date = match &columns.date {
        Some(date_column) => {
            let kind = DateKind::from_cell(Sheet::cell(row, date_column.index));
            if let DateKind::Unparsed(raw) = &kind {
                debug!(
                    "{}: unrecognised date value '{}' at adm{} kept as-is",
                    context.country, raw, context.level
                );
            }
            kind.render()
        }
        None => reference_date.to_string(),
    };

    let parent_code = match &columns.parent {
        Some(parent_column) => Sheet::cell(row, parent_column.index).to_text(),
        None => context.country.clone(),
    };

    Ok(PCode {
        location: context.country.clone(),
        admin_level: context.level.to_string(),
        code,
        name,
        parent_code,
        valid_from_date,
    })
}
