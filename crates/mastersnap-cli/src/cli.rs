//! CLI argument definitions for Mastersnap.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snapshot` | Run one search and write its workbook |
//! | `batch` | Archive previous workbooks, then run several searches |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--base-url` | Mon Master candidate API | Upstream API root |
//! | `--page-size` | `1000` | Formations requested per search |
//! | `--output-dir` | `.` | Where workbooks are written |
//!
//! # Examples
//!
//! ```bash
//! # One search, words joined into a single query
//! mastersnap snapshot mécanique des fluides
//!
//! # Several searches, each argument a full query
//! mastersnap batch "droit des affaires" chimie --output-dir exports
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use mastersnap_core::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};

/// 🎓 Mastersnap - Mon Master formation snapshot tool
///
/// Searches the Mon Master catalogue, enriches every formation with its
/// institution sheet link and last-year admission indicators, and writes
/// the result to an `.xlsx` workbook.
#[derive(Debug, Parser)]
#[command(
    name = "mastersnap",
    author,
    version,
    about = "Mon Master formation snapshot tool",
    long_about = "Mastersnap searches the Mon Master catalogue and writes one spreadsheet per \
query. Features include:\n\
\n\
  • Institution detail lookups with retry and deduplication\n\
  • Last-year admission indicators (access rate, last called rank)\n\
  • Direct links to the formation page and the institution sheet\n\
  • Workbook rotation for repeated batch runs\n\
\n\
Use 'mastersnap <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Upstream API root.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Formations requested per search. The upstream is paged but only the
    /// first page is fetched, so this is also the result cap.
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Directory workbooks are written to.
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📸 Run one search and write its workbook.
    ///
    /// All words are joined into a single query, so quoting is optional.
    ///
    /// # Examples
    ///
    ///   mastersnap snapshot informatique
    ///   mastersnap snapshot mécanique des fluides
    Snapshot(SnapshotArgs),

    /// 🗂️ Rotate previous workbooks into the archive, then run several
    /// searches in sequence.
    ///
    /// Each argument is one full query. A query with no results is logged
    /// and skipped; any other failure stops the batch.
    ///
    /// # Examples
    ///
    ///   mastersnap batch "droit des affaires" chimie
    ///   mastersnap batch psychologie --archive-dir archives
    Batch(BatchArgs),
}

/// Arguments for the `snapshot` command.
#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Search words (e.g. mécanique des fluides).
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
}

/// Arguments for the `batch` command.
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// One full query per argument (quote multi-word queries).
    #[arg(required = true, num_args = 1..)]
    pub queries: Vec<String>,

    /// Where previous workbooks are moved before the batch runs.
    /// Relative paths are resolved under the output directory.
    #[arg(long, default_value = "old_excel_files")]
    pub archive_dir: PathBuf,
}
