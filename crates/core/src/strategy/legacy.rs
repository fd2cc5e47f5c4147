//! Images served by the legacy XML host, which keeps each page's
//! transcription next to the image under the same name with `.xml`.

use url::Url;

use super::{Candidates, Parsed, Strategy, Target, image_urls};
use crate::Result;
use crate::endpoints::Endpoints;
use crate::extract::ParseMode;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyXmlHost;

impl LegacyXmlHost {
    /// The transcription URL for an image on the legacy host.
    pub fn transcription_url(image: &Url, endpoints: &Endpoints) -> String {
        let base = endpoints.legacy_base().as_str().trim_end_matches('/');
        format!("{base}{}.xml", strip_extension(image.path()))
    }
}

/// Removes the extension of the last path segment, if it has one.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

impl Strategy for LegacyXmlHost {
    fn applies_to(&self, target: &Target<'_>, endpoints: &Endpoints) -> bool {
        target
            .record()
            .is_some_and(|record| image_urls(record, |url| endpoints.is_legacy_host(url)).next().is_some())
    }

    fn candidate_urls<'a>(&self, target: &Target<'a>, endpoints: &'a Endpoints) -> Candidates<'a> {
        let Some(record) = target.record() else {
            return Box::new(std::iter::empty());
        };

        Box::new(
            image_urls(record, move |url| endpoints.is_legacy_host(url))
                .map(move |image| Ok(Self::transcription_url(&image, endpoints))),
        )
    }

    fn parse(&self, body: &str, _source_url: &str) -> Result<Parsed> {
        Ok(Parsed::Text(ParseMode::XmlLike.apply(body)))
    }
}
