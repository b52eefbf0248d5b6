//! Per-country processing over a local dataset cache.
//!
//! Orchestrates the workflow around the gazetteer engine using specialized
//! modules for dataset discovery, workbook loading, and output writing.
//! Every failure below the batch level degrades to an empty result for the
//! affected country so that one broken dataset never stops a batch.

pub mod discovery;
pub mod workbook;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::{DatasetManifest, dataset_dir, find_gazetteer};
use self::workbook::{load_admin_sheets, load_table};

use crate::config::Config;
use crate::constants::DATA_HEADERS;
use crate::error::{PcodeError, Result};
use crate::gazetteer::{AssemblyReport, assemble_with_report, extract_global};
use crate::models::PCode;

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Outcome of processing one country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryStatus {
    /// Gazetteer read; may still hold zero records
    Extracted,
    /// No dataset directory or manifest for the country
    MissingDataset,
    /// The dataset has no usable gazetteer resource
    MissingGazetteer,
    /// The dataset's reference period could not be read
    MissingReferenceDate,
    /// The gazetteer file could not be opened
    Unreadable,
    /// The gazetteer has no admin level tabs
    NoAdminSheets,
}

/// Records and counters for one country
#[derive(Debug, Clone)]
pub struct CountryResult {
    pub country: String,
    pub status: CountryStatus,
    pub pcodes: Vec<PCode>,
    pub report: AssemblyReport,
}

impl CountryResult {
    fn empty(country: &str, status: CountryStatus) -> Self {
        Self {
            country: country.to_string(),
            status,
            pcodes: Vec::new(),
            report: AssemblyReport::default(),
        }
    }
}

/// Processing statistics for a batch run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub countries_processed: usize,
    pub countries_empty: usize,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub pcodes_extracted: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    fn record(&mut self, result: &CountryResult) {
        self.countries_processed += 1;
        if result.pcodes.is_empty() {
            self.countries_empty += 1;
        }
        self.sheets_processed += result.report.sheets_processed;
        self.sheets_skipped += result.report.sheets_skipped;
        self.pcodes_extracted += result.pcodes.len();
    }
}

/// Extracts gazetteers for countries whose datasets live in a cache directory
#[derive(Debug)]
pub struct CountryProcessor {
    cache_path: PathBuf,
    config: Config,
}

impl CountryProcessor {
    pub fn new(cache_path: PathBuf, config: Config) -> Self {
        Self { cache_path, config }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract one country's gazetteer; never fails, see [`CountryStatus`]
    pub fn process_country(&self, country: &str) -> CountryResult {
        let dir = dataset_dir(&self.cache_path, country);
        let manifest = match DatasetManifest::load(&dir) {
            Ok(manifest) => manifest,
            Err(PcodeError::DatasetNotFound { .. }) => {
                warn!("{}: Could not find boundary dataset", country);
                return CountryResult::empty(country, CountryStatus::MissingDataset);
            }
            Err(e) => {
                error!("{}: {}", country, e);
                return CountryResult::empty(country, CountryStatus::MissingDataset);
            }
        };

        let Some(gazetteer) = find_gazetteer(&manifest, country, &self.config) else {
            return CountryResult::empty(country, CountryStatus::MissingGazetteer);
        };

        let reference_date = match manifest.reference_date() {
            Ok(date) => date,
            Err(e) => {
                error!("{}: {} in {}", country, e, manifest.name);
                return CountryResult::empty(country, CountryStatus::MissingReferenceDate);
            }
        };

        let path = manifest.resource_path(gazetteer);
        let sheets = match load_admin_sheets(&path) {
            Ok(sheets) => sheets,
            Err(e) => {
                error!("{}: Could not read {}: {}", country, gazetteer.name, e);
                return CountryResult::empty(country, CountryStatus::Unreadable);
            }
        };
        if sheets.is_empty() {
            error!(
                "{}: Could not find correct tab in {}",
                country, gazetteer.name
            );
            return CountryResult::empty(country, CountryStatus::NoAdminSheets);
        }

        let (pcodes, report) =
            assemble_with_report(&sheets, country, &self.config, &reference_date);

        CountryResult {
            country: country.to_string(),
            status: CountryStatus::Extracted,
            pcodes,
            report,
        }
    }

    /// Extract several countries one after another
    ///
    /// Results keep the order of `countries`; each country's records keep
    /// their own order.
    pub fn process_countries(
        &self,
        countries: &[String],
        progress_bar: Option<&ProgressBar>,
    ) -> (Vec<CountryResult>, ProcessingStats) {
        let start_time = Instant::now();
        let mut stats = ProcessingStats::default();
        let mut results = Vec::with_capacity(countries.len());

        for country in countries {
            if let Some(pb) = progress_bar {
                pb.set_message(country.clone());
            }

            let result = self.process_country(country);
            stats.record(&result);
            results.push(result);

            if let Some(pb) = progress_bar {
                pb.inc(1);
            }
        }

        stats.processing_time = start_time.elapsed();
        info!(
            "Processed {} countries: {} P-Codes, {} countries without records",
            stats.countries_processed, stats.pcodes_extracted, stats.countries_empty
        );
        (results, stats)
    }
}

/// Extract a gazetteer from one workbook, outside any dataset cache
///
/// Unlike [`CountryProcessor::process_country`] an unreadable workbook or
/// one without admin tabs is an error, since the caller named the file.
pub fn process_workbook(
    path: &Path,
    country: &str,
    config: &Config,
    reference_date: &str,
) -> Result<(Vec<PCode>, AssemblyReport)> {
    let reference_date = discovery::parse_reference_date(reference_date)?;
    let sheets = load_admin_sheets(path)?;
    if sheets.is_empty() {
        return Err(PcodeError::NoAdminSheets {
            country: country.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(assemble_with_report(&sheets, country, config, &reference_date))
}

/// Read a pre-unified global P-Code table (CSV or first workbook sheet)
pub fn process_global(path: &Path) -> Result<Vec<PCode>> {
    let table = load_table(path)?;
    let pcodes = extract_global(&table, &DATA_HEADERS);
    info!(
        "Read {} global P-Codes from {}",
        pcodes.len().saturating_sub(1),
        path.display()
    );
    Ok(pcodes)
}
