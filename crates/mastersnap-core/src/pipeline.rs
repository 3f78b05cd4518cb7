use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::api::{MonMasterApi, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::cache::DetailCache;
use crate::domain::{SearchQuery, SnapshotRow};
use crate::enrich::Enricher;
use crate::error::SnapshotError;
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::resolver::{DetailSource, RetryingResolver};
use crate::retry::RetryPolicy;

/// Pipeline configuration; defaults mirror the reference front end.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub base_url: String,
    pub page_size: u32,
    pub retry: RetryPolicy,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Counters for one snapshot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub formations: usize,
    /// Distinct institutions looked up.
    pub etablissements: usize,
    /// Institutions whose detail lookup exhausted its attempts.
    pub missing_details: usize,
    /// Rows degraded to placeholders by a merge failure.
    pub incomplete_rows: usize,
}

/// Completed snapshot: ordered rows plus the degradation report.
#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    pub query: SearchQuery,
    pub rows: Vec<SnapshotRow>,
    pub warnings: Vec<String>,
    pub stats: SnapshotStats,
    pub latency_ms: u64,
}

impl SnapshotOutcome {
    /// True when every row merged cleanly and every institution resolved.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// One-query snapshot pipeline: search, enrich, merge.
///
/// The pipeline itself is reusable; lookup memoization lives and dies with
/// a single [`run`](Self::run) so consecutive runs never share state.
pub struct SnapshotPipeline {
    api: Arc<MonMasterApi>,
    retry: RetryPolicy,
    page_size: u32,
}

impl SnapshotPipeline {
    /// Production pipeline over a reqwest transport.
    pub fn new(config: SnapshotConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    /// Pipeline over an arbitrary transport (scripted in tests).
    pub fn with_http_client(http: Arc<dyn HttpClient>, config: SnapshotConfig) -> Self {
        let api = Arc::new(MonMasterApi::new(http).with_base_url(config.base_url));
        Self {
            api,
            retry: config.retry,
            page_size: config.page_size,
        }
    }

    /// Run one snapshot.
    ///
    /// Primary failure and an empty result abort with an error; secondary
    /// failures degrade into warnings on the outcome.
    pub async fn run(&self, query: &SearchQuery) -> Result<SnapshotOutcome, SnapshotError> {
        let started = Instant::now();

        let formations = self.api.fetch_formations(query, self.page_size).await?;
        if formations.is_empty() {
            return Err(SnapshotError::NoResults {
                query: query.to_string(),
            });
        }
        info!(
            query = query.as_str(),
            formations = formations.len(),
            "formations fetched"
        );

        let resolver: Arc<dyn DetailSource> =
            Arc::new(RetryingResolver::new(Arc::clone(&self.api), self.retry));
        let cache = Arc::new(DetailCache::new(resolver));
        let enriched = Enricher::new(Arc::clone(&cache)).enrich(&formations).await;

        let missing = cache.resolved_absent();
        let mut warnings = enriched.warnings;
        for uai in &missing {
            warnings.push(format!(
                "etablissement {uai}: detail lookup exhausted, rows carry no sheet link"
            ));
        }

        let stats = SnapshotStats {
            formations: formations.len(),
            etablissements: cache.len(),
            missing_details: missing.len(),
            incomplete_rows: enriched.incomplete_rows,
        };
        let latency_ms = elapsed_ms(started);
        info!(
            query = query.as_str(),
            formations = stats.formations,
            etablissements = stats.etablissements,
            missing_details = stats.missing_details,
            incomplete_rows = stats.incomplete_rows,
            latency_ms,
            "snapshot assembled"
        );

        Ok(SnapshotOutcome {
            query: query.clone(),
            rows: enriched.rows,
            warnings,
            stats,
            latency_ms,
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
