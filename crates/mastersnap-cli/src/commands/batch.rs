use std::fs;
use std::path::Path;

use tracing::{info, warn};

use mastersnap_core::{SearchQuery, SnapshotError, SnapshotPipeline};
use mastersnap_export::rotate_workbooks;

use crate::cli::BatchArgs;
use crate::error::CliError;

use super::write_outcome;

pub async fn run(
    args: &BatchArgs,
    pipeline: &SnapshotPipeline,
    output_dir: &Path,
) -> Result<(), CliError> {
    // Queries are validated up front so a typo late in the list does not
    // waste the earlier fetches.
    let queries = args
        .queries
        .iter()
        .map(|raw| SearchQuery::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    fs::create_dir_all(output_dir)?;
    let archive_dir = if args.archive_dir.is_absolute() {
        args.archive_dir.clone()
    } else {
        output_dir.join(&args.archive_dir)
    };
    rotate_workbooks(output_dir, &archive_dir)?;

    let total = queries.len();
    for (position, query) in queries.iter().enumerate() {
        info!(%query, position = position + 1, total, "batch query starting");
        match pipeline.run(query).await {
            Ok(outcome) => {
                write_outcome(&outcome, output_dir)?;
            }
            Err(SnapshotError::NoResults { query }) => {
                warn!(%query, "no formation matched, continuing with the next query");
            }
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}
