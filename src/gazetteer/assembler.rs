//! Gazetteer assembly for one country
//!
//! Walks a country's admin sheets in workbook order, resolves each sheet's
//! level and columns, and collects normalized rows. Problems with one sheet
//! never affect the others: unsupported sheet names are skipped with a
//! warning, unclassifiable headers with an error.

use super::header::classify;
use super::level::{resolve_level, resolve_parent_level};
use super::row::{RowSkip, SheetContext, normalize_row};
use crate::config::Config;
use crate::models::{PCode, Sheet};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Counters describing one assembly run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub rows_read: usize,
    pub rows_commented: usize,
    pub rows_without_code: usize,
    pub rows_without_name: usize,
    pub duplicates_dropped: usize,
}

impl AssemblyReport {
    pub fn rows_skipped(&self) -> usize {
        self.rows_commented + self.rows_without_code + self.rows_without_name
    }

    /// Get summary statistics for logging
    pub fn summary(&self) -> String {
        format!(
            "{} sheets processed, {} skipped; {} rows read, {} skipped, {} duplicates dropped",
            self.sheets_processed,
            self.sheets_skipped,
            self.rows_read,
            self.rows_skipped(),
            self.duplicates_dropped
        )
    }

    fn record_skip(&mut self, skip: RowSkip) {
        match skip {
            RowSkip::CommentMarker => self.rows_commented += 1,
            RowSkip::PlaceholderCode => self.rows_without_code += 1,
            RowSkip::MissingName => self.rows_without_name += 1,
        }
    }
}

/// Accumulates one country's records, dropping exact duplicates
///
/// Two records are duplicates only when every field matches; the same code
/// with a different name or date is kept as a separate entry.
#[derive(Debug)]
pub struct GazetteerAssembler<'a> {
    country: String,
    config: &'a Config,
    reference_date: String,
    pcodes: Vec<PCode>,
    seen: HashSet<PCode>,
    report: AssemblyReport,
}

impl<'a> GazetteerAssembler<'a> {
    pub fn new(
        country: impl Into<String>,
        config: &'a Config,
        reference_date: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            config,
            reference_date: reference_date.into(),
            pcodes: Vec::new(),
            seen: HashSet::new(),
            report: AssemblyReport::default(),
        }
    }

    /// Records collected so far, in encounter order
    pub fn pcodes(&self) -> &[PCode] {
        &self.pcodes
    }

    pub fn report(&self) -> &AssemblyReport {
        &self.report
    }

    /// Append a record unless an identical one is already present
    pub fn push(&mut self, pcode: PCode) -> bool {
        if self.seen.contains(&pcode) {
            self.report.duplicates_dropped += 1;
            return false;
        }
        self.seen.insert(pcode.clone());
        self.pcodes.push(pcode);
        true
    }

    /// Process one sheet; returns the number of records it contributed
    pub fn add_sheet(&mut self, sheet: &Sheet) -> usize {
        let Some(context) = self.sheet_context(sheet) else {
            self.report.sheets_skipped += 1;
            return 0;
        };

        let mut added = 0;
        for row in &sheet.rows {
            self.report.rows_read += 1;
            match normalize_row(row, &context, &self.reference_date) {
                Ok(pcode) => {
                    if self.push(pcode) {
                        added += 1;
                    }
                }
                Err(skip) => self.report.record_skip(skip),
            }
        }

        self.report.sheets_processed += 1;
        debug!(
            "{}: sheet '{}' at adm{} yielded {} of {} rows",
            self.country,
            sheet.name,
            context.level,
            added,
            sheet.row_count()
        );
        added
    }

    fn sheet_context(&self, sheet: &Sheet) -> Option<SheetContext> {
        let Some(level) = resolve_level(&sheet.name) else {
            warn!(
                "{}: Could not determine admin level for {}",
                self.country, sheet.name
            );
            return None;
        };

        let parent_level = resolve_parent_level(level, &self.country, self.config);

        match classify(&sheet.columns, level, parent_level, &self.country, self.config) {
            Ok(columns) => Some(SheetContext {
                country: self.country.clone(),
                level,
                parent_level,
                columns,
            }),
            Err(e) => {
                error!("{}: {} (sheet '{}')", self.country, e, sheet.name);
                None
            }
        }
    }

    /// Consume the assembler, returning the records and run counters
    pub fn finish(self) -> (Vec<PCode>, AssemblyReport) {
        (self.pcodes, self.report)
    }
}

/// Assemble a country's gazetteer from its admin sheets
///
/// Sheets are processed in the order given; output is not sorted by level.
/// An empty result means no sheet yielded a usable record.
pub fn assemble(
    sheets: &[Sheet],
    country: &str,
    config: &Config,
    reference_date: &str,
) -> Vec<PCode> {
    assemble_with_report(sheets, country, config, reference_date).0
}

/// [`assemble`], also returning the run counters
pub fn assemble_with_report(
    sheets: &[Sheet],
    country: &str,
    config: &Config,
    reference_date: &str,
) -> (Vec<PCode>, AssemblyReport) {
    if country.trim().is_empty() {
        error!("Cannot assemble a gazetteer without a country code");
        return (Vec::new(), AssemblyReport::default());
    }

    let mut assembler = GazetteerAssembler::new(country, config, reference_date);
    for sheet in sheets {
        assembler.add_sheet(sheet);
    }

    let (pcodes, report) = assembler.finish();
    info!("{}: {} P-Codes ({})", country, pcodes.len(), report.summary());
    (pcodes, report)
}
