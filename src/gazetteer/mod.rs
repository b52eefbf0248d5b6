//! Gazetteer interpretation engine
//!
//! Turns a country's admin level sheets into P-Code records. The engine is
//! pure: sheets come in already loaded, records go out, and nothing is read
//! from or written to disk.
//!
//! # Architecture
//!
//! - [`level`] - admin level from sheet names, parent level with country overrides
//! - [`header`] - code, name, parent, and date column classification
//! - [`row`] - per-row validation, transliteration, date and parent resolution
//! - [`assembler`] - per-country orchestration and duplicate removal
//! - [`global`] - pass-through extraction for pre-unified global tables
//!
//! # Failure scopes
//!
//! A bad row is skipped silently, a bad sheet is skipped with a log entry,
//! and a country with nothing usable yields an empty gazetteer.
//!
//! # Example Usage
//!
//! ```rust
//! use pcode_processor::gazetteer::assemble;
//! use pcode_processor::{CellValue, Config, Sheet};
//!
//! let sheet = Sheet::new(
//!     "ADM1_CMR",
//!     vec!["ADM1_PCODE".to_string(), "ADM1_FR".to_string()],
//!     vec![vec![CellValue::from("CM03"), CellValue::from("ADAMAOUA")]],
//! );
//!
//! let pcodes = assemble(&[sheet], "CMR", &Config::default(), "2019-06-01");
//! assert_eq!(pcodes[0].name, "Adamaoua");
//! assert_eq!(pcodes[0].parent_code, "CMR");
//! ```

pub mod assembler;
pub mod global;
pub mod header;
pub mod level;
pub mod row;

#[cfg(test)]
pub mod tests;

pub use assembler::{AssemblyReport, GazetteerAssembler, assemble, assemble_with_report};
pub use global::extract_global;
pub use header::{ClassifiedColumns, ColumnRef, ColumnRole, ColumnRule, classify};
pub use level::{resolve_level, resolve_parent_level};
pub use row::{DateKind, RowSkip, SheetContext, normalize_name, normalize_row};
