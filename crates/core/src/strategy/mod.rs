//! Hosting-scheme strategies.
//!
//! Each variant knows, for one way the archive hosts page images, how to
//! build the URLs where a transcription might live and how to read what comes
//! back. The set is closed: [`StrategyKind`] enumerates it and dispatches to
//! the per-variant implementations by matching, so that the resolver's
//! priority order is a plain list of values.
//!
//! | Variant | Claims | Fetches |
//! |---|---|---|
//! | ResourceLink | a `resources` entry with `fulltext_file` | that file |
//! | TileImageServices | a tile `image-services` image URL | ALTO from the word-coordinates service |
//! | TileStorageServices | audio records, tile `storage-services` URLs | ALTO from the service, then two storage paths |
//! | LegacyXmlHost | a legacy-host image URL | the sibling `.xml` document |
//! | HtmlDownloadPage | a direct item page URL | the page, then its text download |

use std::fmt;

use url::Url;

use crate::Result;
use crate::endpoints::Endpoints;
use crate::extract::ParseMode;
use crate::record::Record;

pub mod download_page;
pub mod legacy;
pub mod resource_link;
pub mod tile;

pub use download_page::HtmlDownloadPage;
pub use legacy::LegacyXmlHost;
pub use resource_link::ResourceLink;
pub use tile::{IiifImage, StorageObject, TileImageServices, TileStorageServices};

/// What a strategy is asked to find full text for.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A catalog record from the item API.
    Record(&'a Record),
    /// An item page URL supplied directly by the caller.
    ItemPage(&'a Url),
}

impl<'a> Target<'a> {
    pub fn record(&self) -> Option<&'a Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::ItemPage(_) => None,
        }
    }

    /// Identifier for messages.
    pub fn display_id(&self) -> String {
        match self {
            Self::Record(record) => record.display_id().to_string(),
            Self::ItemPage(url) => url.to_string(),
        }
    }
}

/// Candidate URLs in the order they should be tried. Lazily built, so a
/// malformed image URL only errors once the iteration reaches it.
pub type Candidates<'a> = Box<dyn Iterator<Item = Result<String>> + Send + 'a>;

/// What a strategy made of a validated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Final text, or `None` when the response holds no transcription.
    Text(Option<String>),
    /// The response points at the transcription; fetch `url` and read it with `mode`.
    Follow { url: String, mode: ParseMode },
}

/// The capability set every hosting scheme provides.
pub trait Strategy {
    /// Whether this scheme can handle `target`.
    fn applies_to(&self, target: &Target<'_>, endpoints: &Endpoints) -> bool;

    /// URLs where the transcription might be, most likely first.
    fn candidate_urls<'a>(&self, target: &Target<'a>, endpoints: &'a Endpoints) -> Candidates<'a>;

    /// Reads the body fetched from `source_url`.
    fn parse(&self, body: &str, source_url: &str) -> Result<Parsed>;
}

/// The closed set of hosting schemes, in default resolution priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    ResourceLink,
    TileImageServices,
    TileStorageServices,
    LegacyXmlHost,
    HtmlDownloadPage,
}

impl StrategyKind {
    /// Every variant, in default priority order.
    pub const ALL: [StrategyKind; 5] = [
        Self::ResourceLink,
        Self::TileImageServices,
        Self::TileStorageServices,
        Self::LegacyXmlHost,
        Self::HtmlDownloadPage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ResourceLink => "resource-link",
            Self::TileImageServices => "tile-image-services",
            Self::TileStorageServices => "tile-storage-services",
            Self::LegacyXmlHost => "legacy-xml-host",
            Self::HtmlDownloadPage => "html-download-page",
        }
    }

    fn implementation(&self) -> &'static dyn Strategy {
        match self {
            Self::ResourceLink => &ResourceLink,
            Self::TileImageServices => &TileImageServices,
            Self::TileStorageServices => &TileStorageServices,
            Self::LegacyXmlHost => &LegacyXmlHost,
            Self::HtmlDownloadPage => &HtmlDownloadPage,
        }
    }
}

impl Strategy for StrategyKind {
    fn applies_to(&self, target: &Target<'_>, endpoints: &Endpoints) -> bool {
        self.implementation().applies_to(target, endpoints)
    }

    fn candidate_urls<'a>(&self, target: &Target<'a>, endpoints: &'a Endpoints) -> Candidates<'a> {
        self.implementation().candidate_urls(target, endpoints)
    }

    fn parse(&self, body: &str, source_url: &str) -> Result<Parsed> {
        self.implementation().parse(body, source_url)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Image URLs of `record` that parse and satisfy `keep`.
pub(crate) fn image_urls<'a>(
    record: &'a Record, keep: impl Fn(&Url) -> bool + Send + 'a,
) -> impl Iterator<Item = Url> + Send + 'a {
    record
        .image_url
        .iter()
        .filter_map(|raw| Url::parse(raw).ok())
        .filter(move |url| keep(url))
}

/// Rewrites a colon-separated service identifier as a path.
pub(crate) fn identifier_path(identifier: &str) -> String {
    identifier.replace(':', "/")
}
