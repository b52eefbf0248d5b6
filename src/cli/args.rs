//! Command-line argument definitions for the P-Code processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::error::{PcodeError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the P-Code gazetteer processor
///
/// Reads per-country administrative boundary spreadsheets and writes a
/// normalized table of P-Codes, names, parent codes, and validity dates.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pcode-processor",
    version,
    about = "Extract normalized P-Code gazetteers from administrative boundary spreadsheets",
    long_about = "Reads per-country administrative boundary workbooks (one tab per admin level), \
                  works out which columns hold codes, names, parent codes, and dates, and writes \
                  one normalized, deduplicated table of P-Codes."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    ///
    /// Defaults to the user configuration directory when that file exists.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Configuration file (TOML)"
    )]
    pub config_file: Option<PathBuf>,

    /// Output file; standard output when omitted
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        global = true,
        help = "Output file (default: stdout)"
    )]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(
        long = "format",
        value_enum,
        default_value = "csv",
        global = true,
        help = "Output format"
    )]
    pub format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Extract the gazetteer from a single workbook
    Gazetteer(GazetteerArgs),
    /// Extract gazetteers for countries in a local dataset cache
    Process(ProcessArgs),
    /// Read a pre-unified global P-Code table
    Global(GlobalArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct GazetteerArgs {
    /// Workbook with one tab per admin level
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    /// ISO3 country code written to every record
    #[arg(long = "country", value_name = "ISO3")]
    pub country: String,

    /// Valid-from date for rows without a date column
    #[arg(long = "reference-date", value_name = "YYYY-MM-DD")]
    pub reference_date: String,

    /// Add the HXL tag row below the CSV header
    #[arg(long = "hxl")]
    pub hxl: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Dataset cache containing cod-ab-<iso3> directories
    ///
    /// Defaults to the user cache directory.
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input_path: Option<PathBuf>,

    /// Countries to process (comma-separated ISO3 codes); all cached when omitted
    #[arg(long = "countries", value_name = "LIST", value_delimiter = ',')]
    pub countries: Option<Vec<String>>,

    /// Add the HXL tag row below the CSV header
    #[arg(long = "hxl")]
    pub hxl: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct GlobalArgs {
    /// CSV or workbook in the six-column output schema
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,
}

/// Output serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl Args {
    /// Get the log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(PcodeError::configuration(format!(
                    "Configuration file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        match &self.command {
            Commands::Gazetteer(args) => {
                validate_country(&args.country)?;
                if !args.workbook.is_file() {
                    return Err(PcodeError::configuration(format!(
                        "Workbook does not exist: {}",
                        args.workbook.display()
                    )));
                }
            }
            Commands::Process(args) => {
                for country in args.countries.iter().flatten() {
                    validate_country(country)?;
                }
                if let Some(input) = &args.input_path {
                    if !input.is_dir() {
                        return Err(PcodeError::configuration(format!(
                            "Input path is not a directory: {}",
                            input.display()
                        )));
                    }
                }
            }
            Commands::Global(args) => {
                if !args.table.is_file() {
                    return Err(PcodeError::configuration(format!(
                        "Table does not exist: {}",
                        args.table.display()
                    )));
                }
            }
        }

        Ok(())
    }
}

fn validate_country(country: &str) -> Result<()> {
    let country = country.trim();
    if country.is_empty() || !country.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PcodeError::configuration(format!(
            "Invalid country code '{}'",
            country
        )));
    }
    Ok(())
}
