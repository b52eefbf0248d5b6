//! Application constants for the P-Code processor
//!
//! Column names, HXL tags, placeholder values, and the naming conventions
//! used to recognise admin level tabs and gazetteer resources.

// =============================================================================
// Output Schema
// =============================================================================

/// Field names of an output record, in output order
pub const DATA_HEADERS: [&str; 6] = [
    "Location",
    "Admin Level",
    "P-Code",
    "Name",
    "Parent P-Code",
    "Valid from date",
];

/// HXL tags matching [`DATA_HEADERS`] position by position
pub const HXL_HEADERS: [&str; 6] = [
    "#country+code",
    "#geo+admin_level",
    "#adm+code",
    "#adm+name",
    "#adm+code+parent",
    "#date+start",
];

/// Date format for every emitted date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Row Validation
// =============================================================================

/// Marks template, tag, and commented-out rows in source spreadsheets
pub const COMMENT_MARKER: char = '#';

/// Code values that mean "no code" (compared trimmed and lower-cased)
pub const PLACEHOLDER_CODES: &[&str] = &["", "-", "none", "not reported"];

// =============================================================================
// Header Classification
// =============================================================================

/// Reserved name of the per-row validity date column (case-insensitive)
pub const DATE_COLUMN: &str = "validon";

/// Columns containing this are UNHCR cross-references, never P-Codes
pub const UNHCR_MARKER: &str = "unhcr";

/// Columns containing this hold alternate names
pub const ALTERNATE_NAME_MARKER: &str = "alt";

/// Preferred language suffix when several name columns match
pub const ENGLISH_SUFFIX: &str = "_en";

/// Substring preferred among several code columns
pub const PCODE_MARKER: &str = "pcode";

/// Lowest and highest supported admin levels
pub const MIN_ADMIN_LEVEL: u8 = 1;
pub const MAX_ADMIN_LEVEL: u8 = 7;

/// Language suffixes written in non-Latin scripts
pub const DEFAULT_NON_LATIN_ALPHABETS: &[&str] = &[
    "am", "ar", "bn", "fa", "he", "hy", "ka", "km", "ko", "lo", "my", "ne", "ps", "ru", "si",
    "th", "ti", "uk", "ur", "zh",
];

// =============================================================================
// Legacy Spreadsheet Dates
// =============================================================================

/// Serial numbers below this count from 1899-12-31, the rest from 1899-12-30
/// (the 1900 system treats 1900 as a leap year)
pub const EXCEL_1900_LEAP_BUG_SERIAL: i64 = 61;

// =============================================================================
// Datasets and Resources
// =============================================================================

/// Dataset directory prefix; the lower-cased ISO3 code follows
pub const DATASET_PREFIX: &str = "cod-ab-";

/// Manifest file describing a dataset and its resources
pub const MANIFEST_FILE_NAME: &str = "dataset.json";

/// Resource formats that may hold a gazetteer
pub const GAZETTEER_FORMATS: &[&str] = &["xlsx", "xls"];

/// Description keywords identifying a gazetteer among several resources
pub const GAZETTEER_KEYWORDS: &[&str] = &["gazetteer", "taxonomy"];

/// Resource names identifying tabular admin data
pub const TABULAR_RESOURCE_PATTERN: &str = r"(?i)^.*adm.*tabular.?data.*";

/// Sheet names holding admin level data
pub const ADMIN_SHEET_PATTERN: &str = r"(?i)^.*adm(in)?.?[1-7].*";

/// Default application directory name for the dataset cache
pub const APP_DIR_NAME: &str = "pcode-processor";
