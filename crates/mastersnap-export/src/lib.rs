//! # Mastersnap Export
//!
//! Workbook output layer for snapshot runs.
//!
//! ## Overview
//!
//! This crate turns the ordered rows of a snapshot into an `.xlsx`
//! workbook and keeps the output directory tidy between batch runs.
//!
//! ### Features
//!
//! - 📄 **One sheet per run**: `Formations`, French headers, hyperlink cells
//! - 🔢 **Faithful conventions**: `Vrai`/`Faux` booleans, `N/A` for absent
//!   values, `45.67%` access rates
//! - 🗂️ **Rotation**: previous workbooks move into an archive directory,
//!   the previous archive is discarded
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use mastersnap_core::SearchQuery;
//! use mastersnap_export::{workbook_file_name, write_snapshot};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let query = SearchQuery::parse("droit")?;
//!     let rows = Vec::new(); // SnapshotOutcome::rows in a full run
//!
//!     let path = Path::new(".").join(workbook_file_name(&query));
//!     write_snapshot(&path, &rows)?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod workbook;

use thiserror::Error;

pub use archive::{rotate_workbooks, RotationReport};
pub use workbook::{workbook_file_name, write_snapshot, SHEET_NAME};

/// Errors raised while writing or rotating workbooks.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
