//! Command-line interface definitions for dedupe.
//!
//! This module defines all CLI arguments using the clap derive API. Without
//! an action flag the scan is a dry run that lists the files a delete run
//! would remove.
//!
//! # Example
//!
//! ```bash
//! # Dry run: list duplicates
//! dedupe ~/Downloads
//!
//! # Canonical/duplicate pairs as CSV
//! dedupe --csv ~/Downloads > dupes.csv
//!
//! # Move every duplicate to the trash
//! dedupe --delete ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Incremental duplicate file finder.
///
/// Files are grouped by size, fingerprinted only on a size collision, and
/// reported only after a full byte comparison. The first copy found is kept
/// as the canonical.
#[derive(Debug, Parser)]
#[command(name = "dedupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print pairs as CSV ("canonical","duplicate"); same as --output csv
    #[arg(short, long, conflicts_with_all = ["output", "delete"])]
    pub csv: bool,

    /// Delete every duplicate, keeping the canonical copy
    #[arg(short, long, conflicts_with = "output")]
    pub delete: bool,

    /// Output format for the duplicate stream
    #[arg(short, long, value_enum, default_value = "list")]
    pub output: OutputFormat,

    /// Remove files instead of moving them to the trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long, requires = "delete")]
    pub permanent: bool,

    /// Emit a header row in CSV output
    #[arg(long)]
    pub csv_header: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Skip zero-length files
    #[arg(long)]
    pub skip_empty: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of leading bytes covered by a fingerprint (default: 4KiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub prehash_size: Option<u64>,

    /// Capacity of the pipeline queues (default: 64)
    #[arg(long, value_name = "N")]
    pub channel_capacity: Option<usize>,

    /// Abort on the first file that cannot be enumerated
    #[arg(long)]
    pub strict: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file (default: platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// The sink selected by the action flags.
    #[must_use]
    pub fn action(&self) -> Action {
        if self.delete {
            Action::Delete
        } else if self.csv {
            Action::Print(OutputFormat::Csv)
        } else {
            Action::Print(self.output)
        }
    }
}

/// What happens to each confirmed duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Print the pair in the given format.
    Print(OutputFormat),
    /// Delete the duplicate.
    Delete,
}

/// Output format for printed pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One duplicate path per line
    List,
    /// Quoted "canonical","duplicate" rows
    Csv,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::List => write!(f, "list"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dedupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("4KiB").unwrap(), 4096);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
