//! Error handling for P-Code extraction.
//!
//! Fatal errors (unreadable configuration, missing datasets, broken
//! workbooks) surface as [`PcodeError`]. Problems confined to a single sheet
//! are reported as [`ClassificationError`] and only ever cause that sheet to
//! be skipped.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PcodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error in {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid dataset manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid reference date '{value}': expected YYYY-MM-DD")]
    InvalidReferenceDate { value: String },

    #[error("Dataset not found at path: {path}")]
    DatasetNotFound { path: PathBuf },

    #[error("{country}: could not find admin level tabs in {path}")]
    NoAdminSheets { country: String, path: PathBuf },
}

impl PcodeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid reference date error
    pub fn invalid_reference_date(value: impl Into<String>) -> Self {
        Self::InvalidReferenceDate {
            value: value.into(),
        }
    }
}

/// Reasons a sheet's header row cannot be interpreted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("can't find code header at adm{level}")]
    MissingCodeColumn { level: u8 },

    #[error("can't find a unique code header at adm{level}, fallback matched {candidates:?}")]
    AmbiguousCodeFallback { level: u8, candidates: Vec<String> },

    #[error("can't find name header at adm{level}")]
    MissingNameColumn { level: u8 },

    #[error("name column override '{column}' is not present at adm{level}")]
    MissingOverrideColumn { level: u8, column: String },
}

pub type Result<T> = std::result::Result<T, PcodeError>;
