use thiserror::Error;

/// Validation errors for user-supplied search input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query cannot be empty")]
    Empty,
}

/// Failures raised while talking to the Mon Master API.
///
/// `Timeout` only comes out of the per-attempt deadline on etablissement
/// lookups; the formations search either succeeds or aborts the run with
/// whichever variant the transport produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),
    #[error("attempt timed out after {0} ms")]
    Timeout(u64),
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// True when the failure was the per-attempt deadline rather than the
    /// upstream or the network.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// A single formation could not be merged into a snapshot row.
///
/// Merge failures are isolated per record: the failing row degrades to a
/// placeholder and the rest of the batch is unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("formation is missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("merge task failed: {0}")]
    TaskFailed(String),
}

/// Terminal pipeline failures. Everything else degrades into warnings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("formation search failed: {0}")]
    Fetch(#[from] ApiError),
    #[error("no formation matched query '{query}'")]
    NoResults { query: String },
}
