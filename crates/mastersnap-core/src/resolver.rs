use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::MonMasterApi;
use crate::domain::EtablissementDetail;
use crate::error::ApiError;
use crate::retry::RetryPolicy;

/// Source of etablissement mention details.
///
/// `Ok(None)` is the terminal "gave up" outcome. `Err` is reserved for
/// sources that do not absorb their own failures; the production resolver
/// never returns it, but the cache in front of this seam handles it anyway.
pub trait DetailSource: Send + Sync {
    fn resolve<'a>(
        &'a self,
        uai: &'a str,
        inm: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<EtablissementDetail>, ApiError>> + Send + 'a>>;
}

/// Detail lookup with bounded attempts, a fixed delay between them and a
/// deadline per attempt. Exhaustion degrades to absent; it never fails the
/// run.
pub struct RetryingResolver {
    api: Arc<MonMasterApi>,
    policy: RetryPolicy,
}

impl RetryingResolver {
    pub fn new(api: Arc<MonMasterApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    async fn resolve_with_retry(&self, uai: &str, inm: &str) -> Option<EtablissementDetail> {
        let timeout_ms = self.policy.attempt_timeout_ms();

        for attempt in 1..=self.policy.max_attempts {
            let lookup = self.api.fetch_etablissement(uai, inm, timeout_ms);
            let outcome = match tokio::time::timeout(self.policy.attempt_timeout, lookup).await {
                Ok(result) => result,
                // Dropping the lookup future aborts the underlying request.
                Err(_) => Err(ApiError::Timeout(timeout_ms)),
            };

            match outcome {
                Ok(detail) => {
                    debug!(uai, attempt, "etablissement detail resolved");
                    return Some(detail);
                }
                Err(error) if error.is_timeout() => {
                    warn!(
                        uai,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        "etablissement attempt timed out"
                    );
                }
                Err(error) => {
                    warn!(
                        uai,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        %error,
                        "etablissement attempt failed"
                    );
                }
            }

            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        error!(
            uai,
            attempts = self.policy.max_attempts,
            "etablissement lookup exhausted, row will carry no detail data"
        );
        None
    }
}

impl DetailSource for RetryingResolver {
    fn resolve<'a>(
        &'a self,
        uai: &'a str,
        inm: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<EtablissementDetail>, ApiError>> + Send + 'a>>
    {
        Box::pin(async move { Ok(self.resolve_with_retry(uai, inm).await) })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};

    const DETAIL_BODY: &str = r#"{"s1Parcours": [], "lienFiche": "https://univ.example/fiche"}"#;

    struct SequenceHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        calls: AtomicUsize,
    }

    impl SequenceHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HttpClient for SequenceHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = self
                .responses
                .lock()
                .expect("response queue should not be poisoned")
                .pop_front()
                .expect("script exhausted");
            Box::pin(async move { response })
        }
    }

    /// Never answers; forces the per-attempt deadline to fire.
    struct HangingHttpClient {
        calls: AtomicUsize,
    }

    impl HttpClient for HangingHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(HttpResponse::ok_json("{}"))
            })
        }
    }

    fn resolver_over(client: Arc<dyn HttpClient>) -> RetryingResolver {
        let api = Arc::new(MonMasterApi::new(client).with_base_url("https://stub.test/api"));
        RetryingResolver::new(api, RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try_without_waiting() {
        let client = Arc::new(SequenceHttpClient::new(vec![Ok(HttpResponse::ok_json(
            DETAIL_BODY,
        ))]));
        let resolver = resolver_over(Arc::clone(&client) as Arc<dyn HttpClient>);
        let started = tokio::time::Instant::now();

        let detail = resolver.resolve_with_retry("0751717J", "1700218S").await;

        assert!(detail.is_some());
        assert_eq!(client.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn two_failures_then_success_waits_twice() {
        let client = Arc::new(SequenceHttpClient::new(vec![
            Err(HttpError::Connect(String::from("refused"))),
            Ok(HttpResponse {
                status: 502,
                body: String::new(),
            }),
            Ok(HttpResponse::ok_json(DETAIL_BODY)),
        ]));
        let resolver = resolver_over(Arc::clone(&client) as Arc<dyn HttpClient>);
        let started = tokio::time::Instant::now();

        let detail = resolver.resolve_with_retry("0751717J", "1700218S").await;

        assert!(detail.is_some());
        assert_eq!(client.calls(), 3);
        // Exactly two fixed 3 s delays, none after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_degrades_to_none() {
        let client = Arc::new(SequenceHttpClient::new(vec![
            Ok(HttpResponse {
                status: 500,
                body: String::new(),
            }),
            Err(HttpError::Transport(String::from("reset"))),
            Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }),
        ]));
        let resolver = resolver_over(Arc::clone(&client) as Arc<dyn HttpClient>);
        let started = tokio::time::Instant::now();

        let detail = resolver.resolve_with_retry("0751717J", "1700218S").await;

        assert!(detail.is_none());
        assert_eq!(client.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_attempts_hit_the_deadline_and_count() {
        let client = Arc::new(HangingHttpClient {
            calls: AtomicUsize::new(0),
        });
        let resolver = resolver_over(Arc::clone(&client) as Arc<dyn HttpClient>);
        let started = tokio::time::Instant::now();

        let detail = resolver.resolve_with_retry("0751717J", "1700218S").await;

        assert!(detail.is_none());
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        // Three 4 s deadlines, two 3 s delays in between.
        assert_eq!(started.elapsed(), Duration::from_secs(18));
    }

    #[tokio::test(start_paused = true)]
    async fn trait_surface_wraps_outcome_in_ok() {
        let client = Arc::new(SequenceHttpClient::new(vec![Ok(HttpResponse {
            status: 500,
            body: String::new(),
        })]));
        let api = Arc::new(
            MonMasterApi::new(Arc::clone(&client) as Arc<dyn HttpClient>)
                .with_base_url("https://stub.test/api"),
        );
        let resolver = RetryingResolver::new(api, RetryPolicy::no_retry());

        let outcome = resolver
            .resolve("0751717J", "1700218S")
            .await
            .expect("resolver absorbs attempt failures");

        assert!(outcome.is_none());
        assert_eq!(client.calls(), 1);
    }
}
