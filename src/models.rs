//! Core data structures for P-Code extraction.
//!
//! Defines the output record, admin levels, and the in-memory tabular form
//! that loaders hand to the gazetteer engine.

use crate::constants::{DATA_HEADERS, HXL_HEADERS, MAX_ADMIN_LEVEL, MIN_ADMIN_LEVEL};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One administrative unit in the output gazetteer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PCode {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Admin Level")]
    pub admin_level: String,
    #[serde(rename = "P-Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Parent P-Code")]
    pub parent_code: String,
    #[serde(rename = "Valid from date")]
    pub valid_from_date: String,
}

impl PCode {
    /// The self-describing tag record that heads a global registry stream
    pub fn hxl_tags() -> Self {
        let [location, admin_level, code, name, parent_code, valid_from_date] =
            HXL_HEADERS.map(String::from);
        Self {
            location,
            admin_level,
            code,
            name,
            parent_code,
            valid_from_date,
        }
    }

    /// Field values in [`DATA_HEADERS`] order
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.location,
            &self.admin_level,
            &self.code,
            &self.name,
            &self.parent_code,
            &self.valid_from_date,
        ]
    }

    /// Look up a field by its output column name
    pub fn get(&self, header: &str) -> Option<&str> {
        DATA_HEADERS
            .iter()
            .position(|h| *h == header)
            .map(|index| self.fields()[index])
    }
}

/// Administrative nesting depth, always within 1..=7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AdminLevel(u8);

impl AdminLevel {
    /// Create a level, rejecting values outside 1..=7
    pub fn new(level: u8) -> Option<Self> {
        (MIN_ADMIN_LEVEL..=MAX_ADMIN_LEVEL)
            .contains(&level)
            .then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Level 1 units hang directly off the country
    pub fn is_top(self) -> bool {
        self.0 == MIN_ADMIN_LEVEL
    }

    /// The level immediately above, if any
    pub fn above(self) -> Option<Self> {
        Self::new(self.0.saturating_sub(1))
    }
}

impl TryFrom<u8> for AdminLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("admin level {value} is outside 1-7"))
    }
}

impl From<AdminLevel> for u8 {
    fn from(level: AdminLevel) -> Self {
        level.0
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed spreadsheet cell as produced by the loaders
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Missing values: empty cells and NaN
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Render the cell as text; integral floats lose their fractional part
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// One worksheet: a header row and typed data rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Index of the first column with exactly this name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at `index` in `row`; short rows read as empty
    pub fn cell<'a>(row: &'a [CellValue], index: usize) -> &'a CellValue {
        row.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
