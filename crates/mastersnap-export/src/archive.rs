//! Workbook rotation between runs.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::ExportError;

/// What a rotation pass did, for logging and assertions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RotationReport {
    /// Stale files removed from the archive directory.
    pub deleted: usize,
    /// Workbooks moved from the output directory into the archive.
    pub archived: usize,
}

/// Move every workbook at the top of `output_dir` into `archive_dir`,
/// clearing the previous archive generation first.
///
/// The archive keeps exactly one generation: files already present in
/// `archive_dir` are deleted before the current workbooks move in.
/// Non-workbook files and subdirectories are left untouched, so the
/// archive directory may live inside the output directory.
pub fn rotate_workbooks(output_dir: &Path, archive_dir: &Path) -> Result<RotationReport, ExportError> {
    fs::create_dir_all(archive_dir)?;

    let mut report = RotationReport::default();
    for entry in fs::read_dir(archive_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            report.deleted += 1;
        }
    }

    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_workbook(&path) {
            continue;
        }
        let target = archive_dir.join(entry.file_name());
        fs::rename(&path, &target)?;
        debug!(from = %path.display(), to = %target.display(), "workbook archived");
        report.archived += 1;
    }

    info!(
        archived = report.archived,
        deleted = report.deleted,
        "workbook rotation complete"
    );
    Ok(report)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}
