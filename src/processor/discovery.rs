//! Dataset discovery and gazetteer resource selection
//!
//! A local cache holds one directory per country dataset:
//!
//! ```text
//! cache/
//!   cod-ab-cmr/
//!     dataset.json
//!     cmr_adminboundaries_tabulardata.xlsx
//!     cmr_admbnda_shp.zip
//!   cod-ab-arm/
//!     dataset.json
//!     ...
//! ```
//!
//! `dataset.json` describes the dataset and its resources; the gazetteer is
//! the spreadsheet resource chosen by [`find_gazetteer`].

use crate::config::Config;
use crate::constants::{
    DATASET_PREFIX, DATE_FORMAT, GAZETTEER_FORMATS, GAZETTEER_KEYWORDS, MANIFEST_FILE_NAME,
    TABULAR_RESOURCE_PATTERN,
};
use crate::error::{PcodeError, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error};

static TABULAR_RESOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TABULAR_RESOURCE_PATTERN).expect("tabular resource regex"));

/// One downloadable file of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: String,
    /// File location relative to the dataset directory
    pub url: String,
}

impl Resource {
    /// Lower-cased file type, from `format` or else the file extension
    pub fn file_type(&self) -> String {
        if !self.format.trim().is_empty() {
            return self.format.trim().to_lowercase();
        }
        Path::new(&self.url)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Dataset metadata read from `dataset.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub name: String,
    /// Reference period, `[START TO END]`, `MM/DD/YYYY` or `YYYY-MM-DD`
    #[serde(default)]
    pub dataset_date: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(skip)]
    pub dir: PathBuf,
}

impl DatasetManifest {
    /// Read the manifest from a dataset directory
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE_NAME);
        if !path.exists() {
            return Err(PcodeError::DatasetNotFound { path });
        }

        let content = std::fs::read_to_string(&path)?;
        let mut manifest: DatasetManifest =
            serde_json::from_str(&content).map_err(|source| PcodeError::Manifest {
                path: path.clone(),
                source,
            })?;
        manifest.dir = dir.to_path_buf();

        debug!(
            "Loaded manifest for {} with {} resources",
            manifest.name,
            manifest.resources.len()
        );
        Ok(manifest)
    }

    /// Start of the reference period as `YYYY-MM-DD`
    pub fn reference_date(&self) -> Result<String> {
        let raw = self
            .dataset_date
            .as_deref()
            .ok_or_else(|| PcodeError::invalid_reference_date(""))?;
        parse_reference_date(raw)
    }

    /// Absolute location of a resource file
    pub fn resource_path(&self, resource: &Resource) -> PathBuf {
        self.dir.join(&resource.url)
    }
}

/// Extract the start date of a reference period
///
/// Accepts `[2019-06-01T00:00:00 TO 2020-01-01T23:59:59]`, `2019-06-01`,
/// and the older `06/01/2019` or `06/01/2019-12/31/2019` forms.
pub fn parse_reference_date(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let start = trimmed.split(" TO ").next().unwrap_or_default().trim();

    let iso = start.get(..10).and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok());
    let us = || {
        start
            .split('-')
            .next()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").ok())
    };

    iso.or_else(us)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .ok_or_else(|| PcodeError::invalid_reference_date(raw))
}

/// Directory holding a country's boundary dataset
pub fn dataset_dir(cache_path: &Path, country: &str) -> PathBuf {
    cache_path.join(format!("{}{}", DATASET_PREFIX, country.to_lowercase()))
}

/// Countries with a dataset manifest in the cache, sorted
pub fn discover_countries(cache_path: &Path) -> Result<Vec<String>> {
    if !cache_path.exists() {
        return Err(PcodeError::DatasetNotFound {
            path: cache_path.to_path_buf(),
        });
    }

    let pattern = cache_path.join(format!("{}*", DATASET_PREFIX));
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern).map_err(|e| {
        PcodeError::configuration(format!("Invalid cache path pattern {}: {}", pattern, e))
    })?;

    let mut countries: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.join(MANIFEST_FILE_NAME).is_file())
        .filter_map(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix(DATASET_PREFIX))
                .map(str::to_uppercase)
        })
        .filter(|country| !country.is_empty())
        .collect();
    countries.sort();
    countries.dedup();

    debug!(
        "Discovered {} country datasets in {}",
        countries.len(),
        cache_path.display()
    );
    Ok(countries)
}

/// Choose the resource holding a country's gazetteer
///
/// A configured resource exception wins. Otherwise spreadsheet resources are
/// candidates; with several, those described as a gazetteer or taxonomy, or
/// named like admin tabular data, are kept. The first survivor is returned.
pub fn find_gazetteer<'a>(
    manifest: &'a DatasetManifest,
    country: &str,
    config: &Config,
) -> Option<&'a Resource> {
    let mut resources: Vec<&Resource> = match config.resource_exception(country) {
        Some(name) => manifest.resources.iter().filter(|r| r.name == name).collect(),
        None => manifest
            .resources
            .iter()
            .filter(|r| GAZETTEER_FORMATS.contains(&r.file_type().as_str()))
            .collect(),
    };

    if resources.len() > 1 {
        resources.retain(|r| {
            let description = r.description.to_lowercase();
            GAZETTEER_KEYWORDS.iter().any(|k| description.contains(k))
                || TABULAR_RESOURCE_RE.is_match(&r.name)
        });
    }

    match resources.first() {
        Some(resource) => {
            debug!("{}: using gazetteer {}", country, resource.name);
            Some(*resource)
        }
        None => {
            error!("{}: Could not find gazetteer in {}", country, manifest.name);
            None
        }
    }
}
