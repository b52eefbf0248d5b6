//! Command implementations for the P-Code processor CLI
//!
//! This module contains the command execution logic, progress reporting,
//! and output handling for the CLI interface.

use crate::cli::args::{Args, Commands, GazetteerArgs, GlobalArgs, OutputFormat, ProcessArgs};
use crate::config::Config;
use crate::constants::APP_DIR_NAME;
use crate::models::PCode;
use crate::processor::discovery::discover_countries;
use crate::processor::writer::{PCodeWriter, write_json};
use crate::processor::{CountryProcessor, CountryStatus, process_global, process_workbook};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Summary of a finished command, for the final report
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Countries attempted
    pub countries: usize,
    /// Countries that produced no records
    pub countries_empty: Vec<String>,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub rows_skipped: usize,
    pub duplicates_dropped: usize,
    /// Records written, excluding header rows
    pub pcodes_written: usize,
    pub processing_time: Duration,
}

/// Main command runner
///
/// Sets up logging, loads configuration, dispatches the subcommand, writes
/// the records, and prints a summary to stderr.
pub fn run(args: Args) -> Result<RunSummary> {
    let start_time = Instant::now();

    setup_logging(&args)?;
    info!("Starting P-Code processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let mut summary = match &args.command {
        Commands::Gazetteer(cmd) => run_gazetteer(&args, cmd, &config)?,
        Commands::Process(cmd) => run_process(&args, cmd, config)?,
        Commands::Global(cmd) => run_global(&args, cmd)?,
    };
    summary.processing_time = start_time.elapsed();

    if !args.quiet {
        print_summary(&summary);
    }
    Ok(summary)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pcode_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration from `--config`, the default location, or defaults
fn load_configuration(args: &Args) -> Result<Config> {
    let config_file = match &args.config_file {
        Some(path) => Some(path.clone()),
        None => Config::default_config_path().filter(|path| path.exists()),
    };

    match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            Config::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => {
            info!("No config file found, using built-in defaults");
            Ok(Config::default())
        }
    }
}

/// Default dataset cache under the user cache directory
fn default_cache_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir().context("Could not determine user cache directory")?;
    Ok(cache_dir.join(APP_DIR_NAME))
}

fn run_gazetteer(args: &Args, cmd: &GazetteerArgs, config: &Config) -> Result<RunSummary> {
    let country = cmd.country.trim().to_uppercase();
    let (pcodes, report) = process_workbook(&cmd.workbook, &country, config, &cmd.reference_date)
        .with_context(|| format!("Failed to process {}", cmd.workbook.display()))?;
    info!("{}: {}", country, report.summary());

    let pcodes_written = write_output(args, &pcodes, cmd.hxl, false)?;
    Ok(RunSummary {
        countries: 1,
        countries_empty: if pcodes.is_empty() {
            vec![country]
        } else {
            Vec::new()
        },
        sheets_processed: report.sheets_processed,
        sheets_skipped: report.sheets_skipped,
        rows_skipped: report.rows_skipped(),
        duplicates_dropped: report.duplicates_dropped,
        pcodes_written,
        ..Default::default()
    })
}

fn run_process(args: &Args, cmd: &ProcessArgs, config: Config) -> Result<RunSummary> {
    let cache_path = match &cmd.input_path {
        Some(path) => path.clone(),
        None => default_cache_path()?,
    };

    let countries: Vec<String> = match &cmd.countries {
        Some(countries) => countries
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect(),
        None => discover_countries(&cache_path).with_context(|| {
            format!("Failed to discover datasets in {}", cache_path.display())
        })?,
    };
    if countries.is_empty() {
        warn!("No country datasets found in {}", cache_path.display());
    }
    info!("Processing {} countries", countries.len());

    let progress_bar = if args.show_progress() && countries.len() > 1 {
        let pb = ProgressBar::new(countries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let processor = CountryProcessor::new(cache_path, config);
    let (results, stats) = processor.process_countries(&countries, progress_bar.as_ref());

    if let Some(pb) = &progress_bar {
        pb.finish_and_clear();
    }

    let mut summary = RunSummary {
        countries: stats.countries_processed,
        sheets_processed: stats.sheets_processed,
        sheets_skipped: stats.sheets_skipped,
        ..Default::default()
    };
    for result in &results {
        summary.rows_skipped += result.report.rows_skipped();
        summary.duplicates_dropped += result.report.duplicates_dropped;
        if result.pcodes.is_empty() {
            summary.countries_empty.push(result.country.clone());
        }
        if result.status != CountryStatus::Extracted {
            debug!("{}: {:?}", result.country, result.status);
        }
    }

    let pcodes: Vec<PCode> = results.into_iter().flat_map(|r| r.pcodes).collect();
    summary.pcodes_written = write_output(args, &pcodes, cmd.hxl, false)?;
    Ok(summary)
}

fn run_global(args: &Args, cmd: &GlobalArgs) -> Result<RunSummary> {
    let pcodes = process_global(&cmd.table)
        .with_context(|| format!("Failed to read {}", cmd.table.display()))?;
    let pcodes_written = write_output(args, &pcodes, false, true)?;
    Ok(RunSummary {
        pcodes_written,
        ..Default::default()
    })
}

/// Write records to `--output` or stdout in the selected format
///
/// `leading_tag_record` marks record lists whose first entry is the HXL tag
/// record; it is kept in CSV and dropped from JSON.
fn write_output(
    args: &Args,
    pcodes: &[PCode],
    with_hxl: bool,
    leading_tag_record: bool,
) -> Result<usize> {
    let out: Box<dyn Write> = match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(io::BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    let records = if leading_tag_record {
        pcodes.get(1..).unwrap_or_default()
    } else {
        pcodes
    };

    match args.format {
        OutputFormat::Csv => {
            let mut writer = PCodeWriter::new(out);
            writer.write_headers(with_hxl)?;
            writer.write_all(pcodes)?;
            writer.finish()?;
        }
        OutputFormat::Json => write_json(out, records)?,
    }

    if let Some(path) = &args.output {
        info!("Wrote {} P-Codes to {}", records.len(), path.display());
    }
    Ok(records.len())
}

/// Print a human-readable run summary to stderr
fn print_summary(summary: &RunSummary) {
    eprintln!();
    eprintln!("{}", "P-Code extraction complete".green().bold());
    if summary.countries > 0 {
        eprintln!("  Countries processed: {}", summary.countries);
        eprintln!(
            "  Sheets processed:    {} ({} skipped)",
            summary.sheets_processed, summary.sheets_skipped
        );
        eprintln!("  Rows skipped:        {}", summary.rows_skipped);
        eprintln!("  Duplicates dropped:  {}", summary.duplicates_dropped);
    }
    eprintln!(
        "  P-Codes written:     {}",
        summary.pcodes_written.to_string().cyan()
    );
    eprintln!(
        "  Processing time:     {}",
        HumanDuration(summary.processing_time)
    );
    if !summary.countries_empty.is_empty() {
        eprintln!(
            "  {} {}",
            "Countries without records:".yellow(),
            summary.countries_empty.join(", ")
        );
    }
}
