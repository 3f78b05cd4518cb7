use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{EtablissementDetail, Formation, SearchQuery};
use crate::error::ApiError;
use crate::http::{HttpClient, HttpError, HttpRequest};

/// Public candidate API behind the Mon Master front end.
pub const DEFAULT_BASE_URL: &str = "https://monmaster.gouv.fr/api/candidat/mm1";

/// Site origin sent alongside search requests; the endpoint rejects calls
/// without it.
pub const SITE_ORIGIN: &str = "https://monmaster.gouv.fr";

/// Page size the reference front end asks for. The search endpoint caps a
/// run at one page, so this doubles as the record ceiling per snapshot.
pub const DEFAULT_PAGE_SIZE: u32 = 1_000;

/// Deadline for the one-shot formations search. Detail lookups use the
/// per-attempt deadline from [`crate::RetryPolicy`] instead.
const SEARCH_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    content: Vec<Formation>,
}

/// Thin client for the two Mon Master endpoints the pipeline consumes.
///
/// One instance is shared by the fetcher and the resolver; it owns no retry
/// behavior of its own, every method is a single attempt.
#[derive(Clone)]
pub struct MonMasterApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl MonMasterApi {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search formations matching `query`. Always requests page 0; the
    /// caller chooses how large that single page is.
    pub async fn fetch_formations(
        &self,
        query: &SearchQuery,
        page_size: u32,
    ) -> Result<Vec<Formation>, ApiError> {
        let url = format!("{}/formations?size={}&page=0", self.base_url, page_size);
        let referer = format!(
            "{SITE_ORIGIN}/formation?rechercheBrut={}",
            urlencoding::encode(query.as_str())
        );
        let body = serde_json::json!({ "recherche": query.as_str() }).to_string();

        let request = HttpRequest::post(url)
            .with_header("content-type", "application/json")
            .with_header("accept", "application/json")
            .with_header("origin", SITE_ORIGIN)
            .with_header("referer", referer)
            .with_header("user-agent", crate::http::USER_AGENT)
            .with_body(body)
            .with_timeout_ms(SEARCH_TIMEOUT_MS);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Self::map_transport(e, SEARCH_TIMEOUT_MS))?;
        if !response.is_success() {
            return Err(ApiError::UpstreamStatus(response.status));
        }

        let search: SearchResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::decode(format!("formations response: {e}")))?;
        Ok(search.content)
    }

    /// Fetch the mention detail for one etablissement. Single attempt; the
    /// resolver wraps this with its retry policy.
    pub async fn fetch_etablissement(
        &self,
        uai: &str,
        inm: &str,
        timeout_ms: u64,
    ) -> Result<EtablissementDetail, ApiError> {
        let url = format!(
            "{}/etablissements/{}/mentions/{}",
            self.base_url,
            urlencoding::encode(uai),
            urlencoding::encode(inm)
        );

        let request = HttpRequest::get(url).with_timeout_ms(timeout_ms);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Self::map_transport(e, timeout_ms))?;
        if !response.is_success() {
            return Err(ApiError::UpstreamStatus(response.status));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::decode(format!("etablissement response: {e}")))
    }

    fn map_transport(error: HttpError, timeout_ms: u64) -> ApiError {
        match error {
            HttpError::Timeout(_) => ApiError::Timeout(timeout_ms),
            HttpError::Connect(message) | HttpError::Transport(message) => {
                ApiError::Transport(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpMethod, HttpResponse, NoopHttpClient};

    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn with_response(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn query(text: &str) -> SearchQuery {
        SearchQuery::parse(text).expect("query should parse")
    }

    #[tokio::test]
    async fn search_posts_expected_request() {
        let client = Arc::new(RecordingHttpClient::with_response(Ok(HttpResponse::ok_json(
            r#"{"content": []}"#,
        ))));
        let api = MonMasterApi::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let formations = api
            .fetch_formations(&query("mécanique des fluides"), 700)
            .await
            .expect("search should succeed");
        assert!(formations.is_empty());

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            format!("{DEFAULT_BASE_URL}/formations?size=700&page=0")
        );
        assert_eq!(
            request.headers.get("origin").map(String::as_str),
            Some(SITE_ORIGIN)
        );
        assert_eq!(
            request.headers.get("referer").map(String::as_str),
            Some("https://monmaster.gouv.fr/formation?rechercheBrut=m%C3%A9canique%20des%20fluides")
        );
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"recherche":"mécanique des fluides"}"#)
        );
    }

    #[tokio::test]
    async fn search_maps_non_success_status() {
        let client = Arc::new(RecordingHttpClient::with_response(Ok(HttpResponse {
            status: 503,
            body: String::new(),
        })));
        let api = MonMasterApi::new(client);

        let error = api
            .fetch_formations(&query("droit"), DEFAULT_PAGE_SIZE)
            .await
            .expect_err("search must fail");
        assert_eq!(error, ApiError::UpstreamStatus(503));
    }

    #[tokio::test]
    async fn search_maps_malformed_body_to_decode() {
        let client = Arc::new(RecordingHttpClient::with_response(Ok(HttpResponse::ok_json(
            r#"{"content": "not-an-array"}"#,
        ))));
        let api = MonMasterApi::new(client);

        let error = api
            .fetch_formations(&query("droit"), DEFAULT_PAGE_SIZE)
            .await
            .expect_err("search must fail");
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn search_maps_timeout_with_configured_deadline() {
        let client = Arc::new(RecordingHttpClient::with_response(Err(HttpError::Timeout(
            String::from("deadline elapsed"),
        ))));
        let api = MonMasterApi::new(client);

        let error = api
            .fetch_formations(&query("droit"), DEFAULT_PAGE_SIZE)
            .await
            .expect_err("search must fail");
        assert_eq!(error, ApiError::Timeout(SEARCH_TIMEOUT_MS));
    }

    #[tokio::test]
    async fn empty_object_body_reads_as_zero_formations() {
        let api = MonMasterApi::new(Arc::new(NoopHttpClient));

        let formations = api
            .fetch_formations(&query("philosophie"), DEFAULT_PAGE_SIZE)
            .await
            .expect("search should succeed");
        assert!(formations.is_empty());
    }

    #[tokio::test]
    async fn etablissement_url_encodes_path_segments() {
        let client = Arc::new(RecordingHttpClient::with_response(Ok(HttpResponse::ok_json(
            r#"{"s1Parcours": []}"#,
        ))));
        let api = MonMasterApi::new(Arc::clone(&client) as Arc<dyn HttpClient>)
            .with_base_url("https://stub.test/api");

        api.fetch_etablissement("0751717J", "17 00218S", 4_000)
            .await
            .expect("lookup should succeed");

        let requests = client.recorded_requests();
        assert_eq!(
            requests[0].url,
            "https://stub.test/api/etablissements/0751717J/mentions/17%2000218S"
        );
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].timeout_ms, 4_000);
    }
}
