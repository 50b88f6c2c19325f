//! dedupe - Incremental duplicate file finder
//!
//! Files are streamed from a directory walk into a [`duplicates::DuplicateEngine`],
//! which reports each byte-identical copy the moment it is proven, together
//! with the first-discovered copy it duplicates. Confirmed pairs flow to a
//! sink that lists, exports or deletes them.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{DeleteConfig, DeleteOutput};
use crate::cli::{Action, Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, ScanSummary};
use crate::error::ExitCode;
use crate::output::{CsvOutput, DuplicateSink, JsonOutput, ListOutput};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;

/// Run a scan as described by the parsed command line.
///
/// Duplicate output goes to stdout; diagnostics and progress go to stderr.
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing or non-directory
/// root, a failing sink, a strict-mode enumeration error, or interruption
/// (a `FinderError::Interrupted` the caller maps to exit code 130).
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler()?;
    let mut finder_config = finder_config(&cli, &config).with_shutdown_flag(handler.flag());
    if !cli.no_progress && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }
    let finder = DuplicateFinder::new(finder_config);

    let stdout = io::stdout();
    let out = stdout.lock();

    let (summary, delete_failures) = match cli.action() {
        Action::Print(OutputFormat::List) => (scan(&finder, &cli, ListOutput::new(out))?, 0),
        Action::Print(OutputFormat::Csv) => {
            let header = cli.csv_header || config.csv_header;
            let sink = CsvOutput::new(out).with_header(header);
            (scan(&finder, &cli, sink)?, 0)
        }
        Action::Print(OutputFormat::Json) => (scan(&finder, &cli, JsonOutput::new(out))?, 0),
        Action::Delete => {
            let delete_config = DeleteConfig {
                permanent: cli.permanent || config.permanent_delete,
                ..DeleteConfig::default()
            };
            let mut sink = DeleteOutput::new(out, delete_config);
            let summary = finder.find_duplicates(&cli.path, &mut sink)?;
            let result = sink.result();
            log::info!("{}", result.summary());
            (summary, result.failure_count())
        }
    };

    report(&summary);
    Ok(ExitCode::for_scan(
        summary.duplicate_files,
        summary.has_errors() || delete_failures > 0,
    ))
}

fn scan<S: DuplicateSink>(
    finder: &DuplicateFinder,
    cli: &Cli,
    mut sink: S,
) -> anyhow::Result<ScanSummary> {
    Ok(finder.find_duplicates(&cli.path, &mut sink)?)
}

/// Merge CLI flags over the loaded configuration.
fn finder_config(cli: &Cli, config: &Config) -> FinderConfig {
    let mut ignore_patterns = config.ignore_patterns.clone();
    ignore_patterns.extend(cli.ignore_patterns.iter().cloned());

    let walker_config = WalkerConfig {
        follow_symlinks: cli.follow_symlinks || config.follow_symlinks,
        skip_hidden: cli.skip_hidden || config.skip_hidden,
        skip_empty: cli.skip_empty || config.skip_empty,
        min_size: cli.min_size,
        max_size: cli.max_size,
        ignore_patterns,
    };

    FinderConfig::default()
        .with_walker_config(walker_config)
        .with_prehash_size(cli.prehash_size.unwrap_or(config.prehash_size))
        .with_channel_capacity(cli.channel_capacity.unwrap_or(config.channel_capacity))
        .with_strict(cli.strict)
}

fn report(summary: &ScanSummary) {
    for error in &summary.scan_errors {
        log::warn!("Skipped during scan: {}", error);
    }
    if summary.has_errors() {
        log::warn!(
            "{} file(s) could not be scanned, {} could not be read",
            summary.scan_errors.len(),
            summary.hash_errors.len()
        );
    }
    log::info!(
        "{} duplicate(s) among {} files, {} reclaimable",
        summary.duplicate_files,
        summary.total_files,
        summary.reclaimable_display()
    );
}
