//! Main full text API.
//!
//! [`FullTextFetcher`] drives the whole resolution: it checks that the record
//! is online, asks the [`Resolver`] for a strategy, fetches that strategy's
//! candidate URLs one at a time through the [`RateLimitedFetcher`], and reads
//! the first response that validates.
//!
//! Each call is independent; nothing is cached between calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use loctext_core::{FullTextFetcher, Record};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = FullTextFetcher::new()?;
//!
//! let record = fetcher.record_from_item_url("https://www.loc.gov/item/mal0440500/").await?;
//! match fetcher.full_text(&record).await? {
//!     Some(text) => println!("{text}"),
//!     None => println!("no transcription available"),
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use tracing::{debug, info};
use url::Url;

use crate::fetch::{FetchConfig, FetchOutcome, RateLimitedFetcher, Transport};
use crate::record::Record;
use crate::resolver::Resolver;
use crate::strategy::{Parsed, Strategy, StrategyKind, Target};
use crate::{LoctextError, Result};

#[cfg(feature = "fetch")]
use crate::fetch::ReqwestTransport;

/// Outcome of one resolution, with what produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The transcription, or `None` when no candidate held one.
    pub text: Option<String>,
    /// The strategy the resolver picked.
    pub strategy: StrategyKind,
    /// The URL whose response was read, if any validated.
    pub source_url: Option<String>,
}

/// Fetches full text for records and item pages.
#[derive(Debug, Clone)]
pub struct FullTextFetcher<T> {
    fetcher: RateLimitedFetcher<T>,
    resolver: Resolver,
}

#[cfg(feature = "fetch")]
impl FullTextFetcher<ReqwestTransport> {
    /// Creates a fetcher with default settings against the archive's hosts.
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Creates a fetcher with custom HTTP settings against the archive's hosts.
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(transport, config, Resolver::default()))
    }
}

impl<T: Transport> FullTextFetcher<T> {
    /// Creates a fetcher over any transport.
    pub fn with_transport(transport: T, config: FetchConfig, resolver: Resolver) -> Self {
        Self { fetcher: RateLimitedFetcher::new(transport, config), resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn fetcher(&self) -> &RateLimitedFetcher<T> {
        &self.fetcher
    }

    /// Finds the full text of a record.
    ///
    /// Returns `Ok(None)` when the record is online but no transcription
    /// could be fetched.
    ///
    /// # Errors
    ///
    /// [`LoctextError::ObjectNotOnline`] when the record has no `online_format`,
    /// [`LoctextError::UnresolvedRecord`] when no strategy claims it, and
    /// [`LoctextError::UnknownIdentifier`] when a tile URL is malformed.
    pub async fn full_text(&self, record: &Record) -> Result<Option<String>> {
        Ok(self.full_text_report(record).await?.text)
    }

    /// Like [`full_text`](Self::full_text), also reporting which strategy and URL were used.
    pub async fn full_text_report(&self, record: &Record) -> Result<Extraction> {
        if record.online_format.is_none() {
            return Err(LoctextError::ObjectNotOnline { id: record.display_id().to_string() });
        }

        self.extract(Target::Record(record)).await
    }

    /// Finds the full text offered as a download on an item page.
    ///
    /// # Errors
    ///
    /// [`LoctextError::InvalidUrl`] for a malformed URL, and the download page's
    /// [`LoctextError::AmbiguousText`] and [`LoctextError::UnknownFormat`].
    pub async fn full_text_from_url(&self, url: &str) -> Result<Option<String>> {
        Ok(self.full_text_report_from_url(url).await?.text)
    }

    /// Like [`full_text_from_url`](Self::full_text_from_url), also reporting the source.
    pub async fn full_text_report_from_url(&self, url: &str) -> Result<Extraction> {
        let page = parse_http_url(url)?;
        self.extract(Target::ItemPage(&page)).await
    }

    /// Fetches the catalog record behind an item URL from the JSON item API.
    pub async fn record_from_item_url(&self, url: &str) -> Result<Record> {
        let api_url = item_api_url(url)?;

        match self.fetcher.get(api_url.as_str()).await {
            FetchOutcome::Success { body } => Record::from_json(&body),
            outcome => {
                debug!(url = %api_url, ?outcome, "item API lookup failed");
                Err(LoctextError::ItemNotFound(url.to_string()))
            }
        }
    }

    /// Looks up the record behind an item URL and finds its full text.
    pub async fn full_text_from_item_api(&self, url: &str) -> Result<Option<String>> {
        let record = self.record_from_item_url(url).await?;
        self.full_text(&record).await
    }

    async fn extract(&self, target: Target<'_>) -> Result<Extraction> {
        let strategy = self.resolver.resolve(&target)?;
        debug!(id = %target.display_id(), %strategy, "resolved strategy");

        let mut tried = HashSet::new();
        for candidate in strategy.candidate_urls(&target, self.resolver.endpoints()) {
            let url = candidate?;
            if !tried.insert(url.clone()) {
                continue;
            }

            let FetchOutcome::Success { body } = self.fetcher.get(&url).await else {
                continue;
            };

            let text = match strategy.parse(&body, &url)? {
                Parsed::Text(text) => text,
                Parsed::Follow { url: link, mode } => {
                    debug!(page = %url, download = %link, "following download link");
                    self.fetcher.get(&link).await.into_body().and_then(|body| mode.apply(&body))
                }
            };

            info!(
                id = %target.display_id(),
                %strategy,
                source = %url,
                found = text.is_some(),
                "full text resolved"
            );
            return Ok(Extraction { text, strategy, source_url: Some(url) });
        }

        debug!(id = %target.display_id(), %strategy, "no candidate validated");
        Ok(Extraction { text: None, strategy, source_url: None })
    }
}

fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| LoctextError::InvalidUrl(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoctextError::InvalidUrl(format!(
            "{url}: URL must use http:// or https://"
        )));
    }
    Ok(parsed)
}

/// `{scheme}://{host}{path}?fo=json`, dropping any query or fragment.
fn item_api_url(url: &str) -> Result<Url> {
    let mut api_url = parse_http_url(url)?;
    api_url.set_query(Some("fo=json"));
    api_url.set_fragment(None);
    Ok(api_url)
}
