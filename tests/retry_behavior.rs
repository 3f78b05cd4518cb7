//! Behavior-driven tests for detail lookup retries
//!
//! These tests verify HOW the resolver spends its attempt budget against a
//! scripted transport: deadlines cut hung attempts, delays separate retries,
//! and callers waiting on a shared flight never spend extra attempts.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mastersnap_core::{
    DetailCache, DetailSource, HttpClient, HttpError, HttpRequest, HttpResponse, MonMasterApi,
    RetryPolicy, RetryingResolver,
};

const FICHE: &str = r#"{ "s1Parcours": [], "lienFiche": "https://univ.example/fiche" }"#;

enum Reply {
    /// Never answers; only the attempt deadline ends it.
    Hang,
    Status(u16),
    Slow(Duration, &'static str),
    Json(&'static str),
}

/// Answers requests from a fixed script, one reply per attempt. Consumed
/// scripts hang, so an unexpected extra attempt shows up as a timeout.
struct SequencedHttpClient {
    replies: Mutex<VecDeque<Reply>>,
    hits: AtomicUsize,
}

impl SequencedHttpClient {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from(replies)),
            hits: AtomicUsize::new(0),
        })
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl HttpClient for SequencedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .expect("reply script lock is not poisoned")
            .pop_front();
        Box::pin(async move {
            match reply {
                None | Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(600)).await;
                    Err(HttpError::Timeout(String::from("hung reply")))
                }
                Some(Reply::Status(status)) => Ok(HttpResponse {
                    status,
                    body: String::new(),
                }),
                Some(Reply::Slow(delay, body)) => {
                    tokio::time::sleep(delay).await;
                    Ok(HttpResponse::ok_json(body))
                }
                Some(Reply::Json(body)) => Ok(HttpResponse::ok_json(body)),
            }
        })
    }
}

fn resolver_with(
    replies: Vec<Reply>,
    policy: RetryPolicy,
) -> (Arc<SequencedHttpClient>, RetryingResolver) {
    let client = SequencedHttpClient::new(replies);
    let api = Arc::new(MonMasterApi::new(client.clone()).with_base_url("https://scripted.test/api"));
    (client, RetryingResolver::new(api, policy))
}

// =============================================================================
// Retry: Mixed Failure Modes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_an_attempt_times_out_the_next_attempt_can_still_succeed() {
    // Given: a lookup that hangs, then errors, then answers
    let (client, resolver) = resolver_with(
        vec![Reply::Hang, Reply::Status(500), Reply::Json(FICHE)],
        RetryPolicy::default(),
    );

    // When: the detail is resolved
    let started = tokio::time::Instant::now();
    let detail = resolver
        .resolve("0751717J", "1700218S")
        .await
        .expect("resolver absorbs failures")
        .expect("third attempt should succeed");

    // Then: the hung attempt cost its 4 s deadline, each failure cost a 3 s
    // delay, and the quick failure cost nothing
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(client.hits(), 3);
    assert_eq!(detail.lien_fiche.as_deref(), Some("https://univ.example/fiche"));
}

// =============================================================================
// Retry: Deadline Grace
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_a_slow_answer_lands_within_the_deadline_it_is_not_cut_short() {
    // Given: an answer arriving half a second before the deadline
    let (client, resolver) = resolver_with(
        vec![Reply::Slow(Duration::from_millis(3_500), FICHE)],
        RetryPolicy::default(),
    );

    // When: the detail is resolved
    let started = tokio::time::Instant::now();
    let detail = resolver
        .resolve("0751717J", "1700218S")
        .await
        .expect("resolver absorbs failures");

    // Then: the single slow attempt completed
    assert_eq!(started.elapsed(), Duration::from_millis(3_500));
    assert_eq!(client.hits(), 1);
    assert!(detail.is_some());
}

// =============================================================================
// Retry: Shared Flight
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_callers_join_a_retrying_flight_no_extra_requests_leave() {
    // Given: a flight whose first attempt fails, with a second caller
    // arriving during the retry delay
    let (client, resolver) = resolver_with(
        vec![Reply::Status(500), Reply::Json(FICHE)],
        RetryPolicy::default(),
    );
    let cache = Arc::new(DetailCache::new(Arc::new(resolver)));

    let started = tokio::time::Instant::now();
    let leader = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get("0751717J", "1700218S").await })
    };
    let joiner = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cache.get("0751717J", "1700218S").await
        })
    };

    // When: both callers complete
    let lead = leader.await.expect("leader task").expect("lookup succeeds");
    let join = joiner.await.expect("joiner task").expect("lookup succeeds");

    // Then: they share the one retried flight and its two requests
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(client.hits(), 2);
    let lead = lead.expect("detail should be present");
    let join = join.expect("detail should be present");
    assert_eq!(lead.lien_fiche.as_deref(), Some("https://univ.example/fiche"));
    assert_eq!(lead, join);
}

// =============================================================================
// Retry: Policy Shape
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_the_policy_is_tightened_the_whole_wait_shrinks() {
    // Given: a policy of two attempts with 1 s delay and 2 s deadlines,
    // against an upstream that never answers
    let (client, resolver) = resolver_with(
        vec![Reply::Hang, Reply::Hang],
        RetryPolicy::new(2, Duration::from_secs(1), Duration::from_secs(2)),
    );

    // When: the detail is resolved
    let started = tokio::time::Instant::now();
    let detail = resolver
        .resolve("0751717J", "1700218S")
        .await
        .expect("resolver absorbs failures");

    // Then: the lookup degrades after two 2 s deadlines and one 1 s delay
    assert_eq!(detail, None);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(client.hits(), 2);
}
