mod batch;
mod snapshot;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use mastersnap_core::{SnapshotConfig, SnapshotOutcome, SnapshotPipeline};
use mastersnap_export::{workbook_file_name, write_snapshot};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let pipeline = SnapshotPipeline::new(SnapshotConfig {
        base_url: cli.base_url.clone(),
        page_size: cli.page_size,
        ..SnapshotConfig::default()
    });

    match &cli.command {
        Command::Snapshot(args) => snapshot::run(args, &pipeline, &cli.output_dir).await,
        Command::Batch(args) => batch::run(args, &pipeline, &cli.output_dir).await,
    }
}

/// Write one completed run to `{output_dir}/formations_<query>.xlsx` and
/// surface its degradation warnings.
fn write_outcome(outcome: &SnapshotOutcome, output_dir: &Path) -> Result<PathBuf, CliError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(workbook_file_name(&outcome.query));
    write_snapshot(&path, &outcome.rows)?;

    for warning in &outcome.warnings {
        warn!(query = %outcome.query, "{warning}");
    }
    info!(
        query = %outcome.query,
        path = %path.display(),
        formations = outcome.stats.formations,
        etablissements = outcome.stats.etablissements,
        missing_details = outcome.stats.missing_details,
        clean = outcome.is_clean(),
        "snapshot written"
    );
    Ok(path)
}
