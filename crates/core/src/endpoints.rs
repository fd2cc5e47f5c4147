//! Base URLs of the upstream hosts the strategies talk to.

use url::Url;

use crate::{LoctextError, Result};

pub const DEFAULT_TILE_BASE: &str = "https://tile.loc.gov/";
pub const DEFAULT_LEGACY_BASE: &str = "https://lcweb2.loc.gov/";

const WORD_COORDINATES_PATH: &str = "text-services/word-coordinates-service";
const STORAGE_SERVICES_PATH: &str = "storage-services/";

/// Upstream hosts, overridable so that tests can point everything at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    tile_base: Url,
    legacy_base: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            tile_base: Url::parse(DEFAULT_TILE_BASE).expect("default tile base is a valid URL"),
            legacy_base: Url::parse(DEFAULT_LEGACY_BASE).expect("default legacy base is a valid URL"),
        }
    }
}

impl Endpoints {
    /// Creates endpoints from the tile host and legacy XML host base URLs.
    pub fn new(tile_base: &str, legacy_base: &str) -> Result<Self> {
        Ok(Self { tile_base: parse_base(tile_base)?, legacy_base: parse_base(legacy_base)? })
    }

    pub fn tile_base(&self) -> &Url {
        &self.tile_base
    }

    pub fn legacy_base(&self) -> &Url {
        &self.legacy_base
    }

    /// The word-coordinates text service on the tile host.
    pub fn word_coordinates(&self) -> String {
        format!("{}{}", self.tile_base, WORD_COORDINATES_PATH)
    }

    /// Root of the storage services tree on the tile host, with a trailing slash.
    pub fn storage_root(&self) -> String {
        format!("{}{}", self.tile_base, STORAGE_SERVICES_PATH)
    }

    /// Whether `url` is served by the tile host.
    pub fn is_tile_host(&self, url: &Url) -> bool {
        same_host(url, &self.tile_base)
    }

    /// Whether `url` is served by the legacy XML host.
    pub fn is_legacy_host(&self, url: &Url) -> bool {
        same_host(url, &self.legacy_base)
    }
}

/// Parses a base URL and guarantees a trailing slash so joins keep its path.
fn parse_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| LoctextError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(LoctextError::InvalidUrl(format!("{raw}: not a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Host and explicit port must agree; the scheme does not, since records mix http and https.
fn same_host(url: &Url, base: &Url) -> bool {
    url.host_str().is_some() && url.host_str() == base.host_str() && url.port() == base.port()
}
