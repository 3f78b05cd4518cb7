use std::path::Path;

use mastersnap_core::{SearchQuery, SnapshotPipeline};

use crate::cli::SnapshotArgs;
use crate::error::CliError;

use super::write_outcome;

pub async fn run(
    args: &SnapshotArgs,
    pipeline: &SnapshotPipeline,
    output_dir: &Path,
) -> Result<(), CliError> {
    let query = SearchQuery::from_words(&args.words)?;
    let outcome = pipeline.run(&query).await?;
    write_outcome(&outcome, output_dir)?;
    Ok(())
}
