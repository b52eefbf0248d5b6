//! Extraction from a pre-unified global P-Code table.
//!
//! Some authorities publish one table already in the output schema. No
//! column detection applies: the columns are looked up by name and copied.

use crate::constants::COMMENT_MARKER;
use crate::models::{PCode, Sheet};
use tracing::{debug, warn};

/// Copy a six-column table into records, headed by the HXL tag record
///
/// `expected_headers` names the source columns for location, admin level,
/// code, name, parent code, and valid-from date, in that order. Rows whose
/// first cell starts with `#` (the source's own tag row, comments) and
/// blank rows are dropped. Missing columns read as empty strings.
pub fn extract_global(sheet: &Sheet, expected_headers: &[&str; 6]) -> Vec<PCode> {
    let indices = expected_headers.map(|header| sheet.column_index(header));
    for (header, index) in expected_headers.iter().zip(&indices) {
        if index.is_none() {
            warn!("Global P-Code table '{}' has no '{}' column", sheet.name, header);
        }
    }

    let mut pcodes = Vec::with_capacity(sheet.row_count() + 1);
    pcodes.push(PCode::hxl_tags());

    for row in &sheet.rows {
        let first = Sheet::cell(row, 0).to_text();
        if first.starts_with(COMMENT_MARKER) {
            continue;
        }
        if row.iter().all(|cell| cell.is_missing()) {
            continue;
        }

        let [location, admin_level, code, name, parent_code, valid_from_date] =
            indices.map(|index| {
                index
                    .map(|i| Sheet::cell(row, i).to_text())
                    .unwrap_or_default()
            });

        pcodes.push(PCode {
            location,
            admin_level,
            code,
            name,
            parent_code,
            valid_from_date,
        });
    }

    debug!(
        "Extracted {} global P-Codes from '{}'",
        pcodes.len() - 1,
        sheet.name
    );
    pcodes
}
