pub mod endpoints;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_support;

pub use endpoints::Endpoints;
pub use error::{LoctextError, Result};
pub use extract::{ParseMode, normalize_quotes, parse_xml_like};
#[cfg(feature = "fetch")]
pub use fetch::ReqwestTransport;
pub use fetch::{FetchConfig, FetchConfigBuilder, FetchOutcome, HttpResponse, RateLimitedFetcher, Transport, classify};
pub use parse::Document;
pub use pipeline::{Extraction, FullTextFetcher};
pub use record::{Record, Resource};
pub use resolver::Resolver;
pub use strategy::{
    HtmlDownloadPage, IiifImage, LegacyXmlHost, Parsed, ResourceLink, StorageObject, Strategy, StrategyKind, Target,
    TileImageServices, TileStorageServices,
};
