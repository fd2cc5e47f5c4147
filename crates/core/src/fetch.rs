//! Rate-limited HTTP fetching.
//!
//! The archive's hosts throttle aggressively and fail intermittently.
//! [`RateLimitedFetcher`] pauses before every outgoing request, retries the
//! transient statuses a bounded number of times, and then classifies the
//! final response as a [`FetchOutcome`]. It never returns an error: a failed
//! candidate is just a non-success outcome.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::{LoctextError, Result};

/// Body of the JSON error the storage host returns for missing files.
static MISSING_FILE_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""error"\s*:\s*"\[Errno 2\] No such file or directory:"#).expect("missing file pattern compiles")
});

/// The legacy host's not-found page for XML documents.
static NOT_FOUND_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"The requested URL [-_~!*'();:@&=+$,?%#A-Za-z0-9./]+\.xml was not found on this server\.")
        .expect("not found pattern compiles")
});

/// HTTP client configuration.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use loctext_core::FetchConfig;
///
/// let config = FetchConfig::builder()
///     .timeout(10)
///     .min_interval(Duration::from_millis(500))
///     .max_retries(5)
///     .build();
/// assert_eq!(config.retry_statuses, vec![429, 500, 503]);
/// ```
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Pause before every outgoing request, retries included.
    pub min_interval: Duration,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Statuses that count as transient.
    pub retry_statuses: Vec<u16>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; loctext/0.1)".to_string(),
            min_interval: Duration::from_millis(300),
            max_retries: 3,
            retry_statuses: vec![429, 500, 503],
        }
    }
}

impl FetchConfig {
    /// Creates a new builder for FetchConfig.
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::new()
    }
}

/// Builder for FetchConfig.
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: FetchConfig::default() }
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.timeout = secs;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    /// Sets the pause before each request.
    pub fn min_interval(mut self, value: Duration) -> Self {
        self.config.min_interval = value;
        self
    }

    /// Sets the retry budget.
    pub fn max_retries(mut self, value: u32) -> Self {
        self.config.max_retries = value;
        self
    }

    /// Sets the statuses that are retried.
    pub fn retry_statuses(mut self, value: Vec<u16>) -> Self {
        self.config.retry_statuses = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl Default for FetchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Status and decoded body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Issues single GET requests. Errors are transport-level failures
/// (connection, timeout); any status code is an `Ok` response.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse>> + Send;
}

#[cfg(feature = "fetch")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "fetch")]
mod reqwest_transport {
    use std::time::Duration;

    use reqwest::Client;
    use url::Url;

    use super::{FetchConfig, HttpResponse, Transport};
    use crate::{LoctextError, Result};

    /// [`Transport`] over one reused `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: Client,
        timeout: u64,
    }

    impl ReqwestTransport {
        pub fn new(config: &FetchConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout))
                .user_agent(&config.user_agent)
                .build()
                .map_err(LoctextError::HttpError)?;

            Ok(Self { client, timeout: config.timeout })
        }
    }

    impl Transport for ReqwestTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            let parsed_url = Url::parse(url).map_err(|e| LoctextError::InvalidUrl(format!("{url}: {e}")))?;

            let response = self
                .client
                .get(parsed_url)
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.9")
                .send()
                .await
                .map_err(|e| self.request_error(e))?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| self.request_error(e))?;

            Ok(HttpResponse { status, body })
        }
    }

    impl ReqwestTransport {
        fn request_error(&self, e: reqwest::Error) -> LoctextError {
            if e.is_timeout() {
                LoctextError::Timeout { timeout: self.timeout }
            } else {
                LoctextError::HttpError(e)
            }
        }
    }
}

/// Classified result of fetching one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status 200 with a usable body.
    Success { body: String },
    /// Status 200 with nothing in it.
    EmptyBody,
    /// The host reported the document missing, by status or by error page.
    NotFoundOnServer,
    /// Any other non-200 status, including transient ones that ran out of retries.
    HttpError(u16),
    /// The request never produced a response.
    TransportFailure(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The body of a successful fetch.
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body } => Some(body),
            _ => None,
        }
    }
}

/// Validates a response. A success needs status 200, a non-blank body, and
/// none of the hosts' "missing document" payloads.
pub fn classify(response: HttpResponse) -> FetchOutcome {
    match response.status {
        200 => {}
        404 | 410 => return FetchOutcome::NotFoundOnServer,
        status => return FetchOutcome::HttpError(status),
    }

    if response.body.trim().is_empty() {
        FetchOutcome::EmptyBody
    } else if MISSING_FILE_ERROR.is_match(&response.body) || NOT_FOUND_PAGE.is_match(&response.body) {
        FetchOutcome::NotFoundOnServer
    } else {
        FetchOutcome::Success { body: response.body }
    }
}

/// Wraps a [`Transport`] with a pause before every request and bounded retries.
#[derive(Debug, Clone)]
pub struct RateLimitedFetcher<T> {
    transport: T,
    config: FetchConfig,
}

impl<T: Transport> RateLimitedFetcher<T> {
    pub fn new(transport: T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `url`, retrying transient statuses and transport failures up to
    /// `max_retries` times.
    pub async fn get(&self, url: &str) -> FetchOutcome {
        let mut attempt = 0;

        loop {
            tokio::time::sleep(self.config.min_interval).await;
            debug!(url, attempt, "requesting");

            let retries_left = attempt < self.config.max_retries;
            match self.transport.get(url).await {
                Ok(response) if self.config.retry_statuses.contains(&response.status) => {
                    if !retries_left {
                        warn!(url, status = response.status, "retries exhausted");
                        return FetchOutcome::HttpError(response.status);
                    }
                    debug!(url, status = response.status, "transient status, retrying");
                }
                Ok(response) => {
                    let outcome = classify(response);
                    debug!(url, ?outcome, "fetched");
                    return outcome;
                }
                Err(e @ LoctextError::InvalidUrl(_)) => {
                    debug!(url, error = %e, "not retrying an invalid URL");
                    return FetchOutcome::TransportFailure(e.to_string());
                }
                Err(e) => {
                    if !retries_left {
                        warn!(url, error = %e, "retries exhausted");
                        return FetchOutcome::TransportFailure(e.to_string());
                    }
                    debug!(url, error = %e, "transport failure, retrying");
                }
            }

            attempt += 1;
        }
    }
}
