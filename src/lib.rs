//! P-Code Processor Library
//!
//! Extracts a normalized gazetteer of administrative-area codes (P-Codes)
//! from per-country administrative boundary spreadsheets.
//!
//! This library provides tools for:
//! - Resolving admin levels from sheet names such as `ADM2_CMR`
//! - Classifying code, name, parent, and date columns heuristically
//! - Transliterating and title-casing unit names
//! - Reconciling spreadsheet serial dates with ISO dates
//! - Removing exact duplicate records
//! - Selecting a country's gazetteer among its dataset resources
//! - Loading workbooks and writing HXL-tagged CSV output

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod gazetteer;
pub mod models;
pub mod processor;

pub use config::{Config, CountryOverrides, ParentLevelOverride};
pub use error::{ClassificationError, PcodeError, Result};
pub use models::{AdminLevel, CellValue, PCode, Sheet};
