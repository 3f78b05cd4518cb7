use thiserror::Error;

use mastersnap_core::{QueryError, SnapshotError};
use mastersnap_export::ExportError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Query(_) => 2,
            Self::Snapshot(SnapshotError::NoResults { .. }) => 3,
            Self::Snapshot(SnapshotError::Fetch(_)) => 4,
            Self::Export(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
