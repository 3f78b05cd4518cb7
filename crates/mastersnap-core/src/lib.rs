//! # Mastersnap Core
//!
//! Fetch and enrichment pipeline for Mon Master formation snapshots.
//!
//! ## Overview
//!
//! One snapshot run turns a free-text query into an ordered set of merged
//! records:
//!
//! - **Formations search** against the public candidate API (one page,
//!   fatal on failure)
//! - **Etablissement detail lookups** with bounded retries, fixed backoff
//!   and a per-attempt deadline (degrade on failure, never abort)
//! - **In-flight deduplication** of lookups keyed by institution, so N
//!   formations of one etablissement cost one upstream call
//! - **Concurrent merge** that preserves the upstream result order and
//!   isolates per-record failures as placeholder rows
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Thin client for the two Mon Master endpoints |
//! | [`cache`] | Singleflight memoization of detail lookups |
//! | [`domain`] | Payload models, query type, merged row |
//! | [`enrich`] | Fan-out, merge rules, placeholder policy |
//! | [`error`] | Error taxonomy per pipeline layer |
//! | [`http`] | HTTP client abstraction (reqwest or scripted) |
//! | [`pipeline`] | End-to-end snapshot run |
//! | [`resolver`] | Retrying detail lookup behind the [`resolver::DetailSource`] seam |
//! | [`retry`] | Attempt/backoff/deadline policy |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mastersnap_core::{SearchQuery, SnapshotConfig, SnapshotPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = SnapshotPipeline::new(SnapshotConfig::default());
//!     let query = SearchQuery::parse("mécanique des fluides")?;
//!
//!     let outcome = pipeline.run(&query).await?;
//!     for row in &outcome.rows {
//!         println!("{} ({})", row.intitule_mention, row.ville.as_deref().unwrap_or("N/A"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure semantics
//!
//! | Stage | On failure |
//! |-------|------------|
//! | Formations search | Run aborts (`SnapshotError::Fetch`) |
//! | Empty search result | Run aborts (`SnapshotError::NoResults`), nothing written |
//! | Detail lookup attempt | Retried up to the policy's `max_attempts` |
//! | Detail lookup exhausted | Rows keep primary data, warning recorded |
//! | Merge of one record | That row becomes a placeholder, warning recorded |

pub mod api;
pub mod cache;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod resolver;
pub mod retry;

pub use api::{MonMasterApi, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, SITE_ORIGIN};
pub use cache::{DetailCache, DetailOutcome};
pub use domain::{
    EtablissementDetail, Formation, Indicateurs, Lieu, ParcoursFiche, SearchQuery, SnapshotRow,
};
pub use enrich::{normalize_taux_acces, select_lien_fiche, EnrichOutcome, Enricher};
pub use error::{ApiError, MergeError, QueryError, SnapshotError};
pub use http::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use pipeline::{SnapshotConfig, SnapshotOutcome, SnapshotPipeline, SnapshotStats};
pub use resolver::{DetailSource, RetryingResolver};
pub use retry::RetryPolicy;
