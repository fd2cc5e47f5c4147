//! Error types for full text resolution.
//!
//! [`LoctextError`] is the single error type returned by the library. The
//! first five variants are the outcomes a caller is expected to branch on;
//! the rest describe malformed input or a transport that could not be built.
//!
//! Note that "no transcription exists" is not an error: the pipeline reports
//! it as `Ok(None)`.
//!
//! # Example
//!
//! ```rust
//! use loctext_core::{LoctextError, Record, Result};
//!
//! fn require_online(record: &Record) -> Result<()> {
//!     if record.online_format.is_none() {
//!         return Err(LoctextError::ObjectNotOnline { id: record.display_id().to_string() });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for full text resolution.
///
/// # Example
///
/// ```rust,no_run
/// use loctext_core::{FullTextFetcher, LoctextError, Record};
///
/// # async fn run(record: Record) {
/// let fetcher = FullTextFetcher::new().unwrap();
/// match fetcher.full_text(&record).await {
///     Ok(Some(text)) => println!("{text}"),
///     Ok(None) => println!("no transcription"),
///     Err(LoctextError::ObjectNotOnline { id }) => println!("{id} is not online"),
///     Err(e) => println!("Error: {e}"),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum LoctextError {
    /// The record has no `online_format` key, so nothing about it is published online.
    #[error("{id} does not have an online_format key")]
    ObjectNotOnline { id: String },

    /// No strategy in the resolver's priority list claims the record.
    #[error("No full text strategy applies to {id}")]
    UnresolvedRecord { id: String },

    /// A tile service URL does not follow the expected path grammar.
    #[error("Unrecognized tile service identifier in {0}")]
    UnknownIdentifier(String),

    /// A download link has neither an `.xml` nor a `.txt` extension.
    #[error("Unknown full text format: {0}")]
    UnknownFormat(String),

    /// An item page offers several "all pages" text downloads.
    #[error("Item page offers {count} full text downloads for all pages")]
    AmbiguousText { count: usize },

    /// The item API returned nothing usable for an item URL.
    #[error("Item API returned no record for {0}")]
    ItemNotFound(String),

    /// HTTP client construction or request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector or unusable markup.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The record JSON does not have the expected shape.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// JSON decoding errors.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoctextError {
    /// Whether this error is one of the outcomes the resolution contract
    /// surfaces to callers, as opposed to a malformed input or transport problem.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::ObjectNotOnline { .. }
                | Self::UnresolvedRecord { .. }
                | Self::UnknownIdentifier(_)
                | Self::UnknownFormat(_)
                | Self::AmbiguousText { .. }
        )
    }
}

/// Result type alias for LoctextError.
pub type Result<T> = std::result::Result<T, LoctextError>;
