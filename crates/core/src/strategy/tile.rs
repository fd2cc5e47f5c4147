//! Images served by the tile host.
//!
//! Two path grammars live on the tile host. IIIF image URLs look like
//! `/image-services/iiif/{identifier}/{region}/{size}/{rotation}/{quality}.{format}`
//! and storage URLs like `/storage-services/{identifier}/{file}.{format}`. In
//! both, the identifier is what the text services key their ALTO documents on;
//! for storage objects that is the directory holding the file.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::{Candidates, Parsed, Strategy, Target, identifier_path, image_urls};
use crate::endpoints::Endpoints;
use crate::extract::ParseMode;
use crate::record::Record;
use crate::{LoctextError, Result};

/// Characters allowed in one path component of a tile URL, period excluded.
const URL_CHARS: &str = r"-_~!*'();:@&=+$,?%#A-Za-z0-9";

static IIIF_PATH: LazyLock<Regex> = LazyLock::new(|| {
    let c = URL_CHARS;
    Regex::new(&format!(
        r"/image[-_]services/iiif/(?P<identifier>[{c}.]+)/(?P<region>[{c}.]+)/(?P<size>[{c}.]+)/(?P<rotation>[{c}.]+)/(?P<quality>[{c}]+)\.(?P<format>[{c}.]+)$"
    ))
    .expect("iiif path pattern compiles")
});

static STORAGE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    let c = URL_CHARS;
    Regex::new(&format!(r"/storage[-_]services/(?P<identifier>[{c}./]+)/(?P<file>[{c}.]+)$"))
        .expect("storage path pattern compiles")
});

/// The components of an IIIF image request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IiifImage {
    pub identifier: String,
    pub region: String,
    pub size: String,
    pub rotation: String,
    pub quality: String,
    pub format: String,
}

impl IiifImage {
    /// Parses an image URL.
    ///
    /// # Errors
    ///
    /// Returns [`LoctextError::UnknownIdentifier`] when the path does not follow the IIIF grammar.
    pub fn parse(url: &Url) -> Result<Self> {
        let caps = IIIF_PATH
            .captures(url.path())
            .ok_or_else(|| LoctextError::UnknownIdentifier(url.to_string()))?;

        Ok(Self {
            identifier: caps["identifier"].to_string(),
            region: caps["region"].to_string(),
            size: caps["size"].to_string(),
            rotation: caps["rotation"].to_string(),
            quality: caps["quality"].to_string(),
            format: caps["format"].to_string(),
        })
    }
}

/// The components of a storage services path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    /// Directory of the file, relative to the storage root.
    pub identifier: String,
    /// File extension, empty when the file has none.
    pub format: String,
}

impl StorageObject {
    /// Parses a storage URL.
    ///
    /// # Errors
    ///
    /// Returns [`LoctextError::UnknownIdentifier`] when the path does not follow the storage grammar.
    pub fn parse(url: &Url) -> Result<Self> {
        let caps = STORAGE_PATH
            .captures(url.path())
            .ok_or_else(|| LoctextError::UnknownIdentifier(url.to_string()))?;

        let format = caps["file"].rsplit_once('.').map_or("", |(_, ext)| ext);
        Ok(Self { identifier: caps["identifier"].to_string(), format: format.to_string() })
    }

    /// Final path segment of the identifier.
    pub fn last_segment(&self) -> &str {
        self.identifier.rsplit('/').next().unwrap_or(&self.identifier)
    }
}

fn word_coordinates_url(endpoints: &Endpoints, segment: &str) -> String {
    format!(
        "{}?full_text=1&format=alto_xml&segment=/{}.xml",
        endpoints.word_coordinates(),
        segment
    )
}

fn under_service(url: &Url, service: &str) -> bool {
    let path = url.path();
    path.contains(&format!("{service}-services")) || path.contains(&format!("{service}_services"))
}

fn iiif_images<'a>(record: &'a Record, endpoints: &'a Endpoints) -> impl Iterator<Item = Url> + Send + 'a {
    image_urls(record, move |url| endpoints.is_tile_host(url) && under_service(url, "image"))
}

fn storage_images<'a>(record: &'a Record, endpoints: &'a Endpoints) -> impl Iterator<Item = Url> + Send + 'a {
    image_urls(record, move |url| endpoints.is_tile_host(url) && under_service(url, "storage"))
}

/// ALTO text for IIIF images on the tile host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileImageServices;

impl Strategy for TileImageServices {
    fn applies_to(&self, target: &Target<'_>, endpoints: &Endpoints) -> bool {
        target
            .record()
            .is_some_and(|record| iiif_images(record, endpoints).next().is_some())
    }

    fn candidate_urls<'a>(&self, target: &Target<'a>, endpoints: &'a Endpoints) -> Candidates<'a> {
        let Some(record) = target.record() else {
            return Box::new(std::iter::empty());
        };

        Box::new(iiif_images(record, endpoints).map(move |url| {
            let image = IiifImage::parse(&url)?;
            Ok(word_coordinates_url(endpoints, &identifier_path(&image.identifier)))
        }))
    }

    fn parse(&self, body: &str, _source_url: &str) -> Result<Parsed> {
        Ok(Parsed::Text(ParseMode::Raw.apply(body)))
    }
}

/// ALTO text for storage-hosted objects, audio transcripts included.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileStorageServices;

impl TileStorageServices {
    /// The three places an object's ALTO may live, in the order they are tried.
    pub fn urls_for(object: &StorageObject, endpoints: &Endpoints) -> [String; 3] {
        let root = endpoints.storage_root();
        let identifier = &object.identifier;
        [
            word_coordinates_url(endpoints, &format!("{}.alto", identifier_path(identifier))),
            format!("{root}{identifier}.alto.xml"),
            format!("{root}{identifier}/{}.xml", object.last_segment()),
        ]
    }
}

impl Strategy for TileStorageServices {
    fn applies_to(&self, target: &Target<'_>, endpoints: &Endpoints) -> bool {
        target
            .record()
            .is_some_and(|record| record.is_audio() || storage_images(record, endpoints).next().is_some())
    }

    /// Audio records may have no storage image at all; then every image URL
    /// is tried against the storage grammar.
    fn candidate_urls<'a>(&self, target: &Target<'a>, endpoints: &'a Endpoints) -> Candidates<'a> {
        let Some(record) = target.record() else {
            return Box::new(std::iter::empty());
        };

        let sources: Vec<std::result::Result<Url, String>> = if storage_images(record, endpoints).next().is_some() {
            storage_images(record, endpoints).map(Ok).collect()
        } else {
            record
                .image_url
                .iter()
                .map(|raw| Url::parse(raw).map_err(|_| raw.clone()))
                .collect()
        };

        Box::new(sources.into_iter().flat_map(move |source| {
            let urls: Vec<Result<String>> = match source.map_err(LoctextError::UnknownIdentifier) {
                Ok(url) => match StorageObject::parse(&url) {
                    Ok(object) => Self::urls_for(&object, endpoints).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                },
                Err(e) => vec![Err(e)],
            };
            urls
        }))
    }

    fn parse(&self, body: &str, _source_url: &str) -> Result<Parsed> {
        Ok(Parsed::Text(ParseMode::Raw.apply(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn record(format: &str, images: &[&str]) -> Record {
        Record::from_value(json!({"id": "abc", "online_format": [format], "image_url": images})).unwrap()
    }

    fn candidates(strategy: &dyn Strategy, record: &Record) -> Vec<Result<String>> {
        let endpoints = Endpoints::default();
        strategy.candidate_urls(&Target::Record(record), &endpoints).collect()
    }

    #[test]
    fn test_iiif_image_components() {
        let url = Url::parse("https://tile.loc.gov/image-services/iiif/abc123:1/full/pct:100/0/default.jpg").unwrap();
        let image = IiifImage::parse(&url).unwrap();

        assert_eq!(image.identifier, "abc123:1");
        assert_eq!(image.region, "full");
        assert_eq!(image.size, "pct:100");
        assert_eq!(image.rotation, "0");
        assert_eq!(image.quality, "default");
        assert_eq!(image.format, "jpg");
    }

    #[test]
    fn test_image_services_request() {
        let record = record(
            "image",
            &["https://tile.loc.gov/image-services/iiif/abc123:1/full/pct:100/0/default.jpg"],
        );
        let urls = candidates(&TileImageServices, &record);

        assert_eq!(urls.len(), 1);
        let url = urls[0].as_ref().unwrap();
        assert_eq!(
            url,
            "https://tile.loc.gov/text-services/word-coordinates-service?full_text=1&format=alto_xml&segment=/abc123/1.xml"
        );
    }

    #[test]
    fn test_image_services_with_fragment() {
        let record = record(
            "image",
            &["https://tile.loc.gov/image_services/iiif/service:gdc:scd0001:0002/full/pct:6.25/0/default.jpg#h=300&w=200"],
        );
        let urls = candidates(&TileImageServices, &record);

        assert!(urls[0].as_ref().unwrap().ends_with("segment=/service/gdc/scd0001/0002.xml"));
    }

    #[rstest]
    #[case("https://tile.loc.gov/image-services/iiif/abc/full/default.jpg")]
    #[case("https://tile.loc.gov/image-services/iiif/abc/full/pct:100/0/default")]
    fn test_unknown_identifier(#[case] image: &str) {
        let record = record("image", &[image]);
        assert!(TileImageServices.applies_to(&Target::Record(&record), &Endpoints::default()));

        let urls = candidates(&TileImageServices, &record);
        assert!(matches!(urls[0], Err(LoctextError::UnknownIdentifier(_))));
    }

    #[test]
    fn test_image_services_requires_tile_host() {
        let record = record("image", &["https://example.org/image-services/iiif/a:1/full/full/0/default.jpg"]);
        assert!(!TileImageServices.applies_to(&Target::Record(&record), &Endpoints::default()));
    }

    #[test]
    fn test_storage_urls_in_order() {
        let record = record(
            "audio",
            &["https://tile.loc.gov/storage-services/service/afc/afc1941016_afs05499a/afc1941016_afs05499a.jpg"],
        );
        let urls: Vec<String> = candidates(&TileStorageServices, &record)
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://tile.loc.gov/text-services/word-coordinates-service?full_text=1&format=alto_xml&segment=/service/afc/afc1941016_afs05499a.alto.xml",
                "https://tile.loc.gov/storage-services/service/afc/afc1941016_afs05499a.alto.xml",
                "https://tile.loc.gov/storage-services/service/afc/afc1941016_afs05499a/afc1941016_afs05499a.xml",
            ]
        );
    }

    #[rstest]
    #[case("https://tile.loc.gov/storage-services/service/gdc/scd0001/0001.jp2", "service/gdc/scd0001", "jp2", "scd0001")]
    #[case("https://tile.loc.gov/storage-services/master/v1.2/item.0001.jpg", "master/v1.2", "jpg", "v1.2")]
    #[case("https://tile.loc.gov/storage_services/service/mss/README", "service/mss", "", "mss")]
    fn test_storage_object_is_parent_directory(
        #[case] url: &str, #[case] identifier: &str, #[case] format: &str, #[case] last: &str,
    ) {
        let object = StorageObject::parse(&Url::parse(url).unwrap()).unwrap();

        assert_eq!(object.identifier, identifier);
        assert_eq!(object.format, format);
        assert_eq!(object.last_segment(), last);
    }

    #[test]
    fn test_storage_needs_a_directory() {
        let url = Url::parse("https://tile.loc.gov/storage-services/0001.jpg").unwrap();
        assert!(matches!(StorageObject::parse(&url), Err(LoctextError::UnknownIdentifier(_))));
    }

    #[test]
    fn test_audio_claims_storage() {
        let record = record("audio", &["https://www.loc.gov/static/images/original-format/audio.png"]);
        assert!(TileStorageServices.applies_to(&Target::Record(&record), &Endpoints::default()));

        let urls = candidates(&TileStorageServices, &record);
        assert_eq!(urls.len(), 1);
        assert!(matches!(urls[0], Err(LoctextError::UnknownIdentifier(_))));
    }

    #[test]
    fn test_storage_ignores_other_hosts_when_tile_present() {
        let record = record(
            "image",
            &[
                "https://lcweb2.loc.gov/service/x.gif",
                "https://tile.loc.gov/storage-services/service/x/0001.jpg",
            ],
        );
        let urls = candidates(&TileStorageServices, &record);

        assert_eq!(urls.len(), 3);
        assert!(urls.iter().all(Result::is_ok));
    }

    #[test]
    fn test_raw_parse() {
        let parsed = TileStorageServices.parse("<alto/>", "u").unwrap();
        assert_eq!(parsed, Parsed::Text(Some("<alto/>".to_string())));
        assert_eq!(TileImageServices.parse("", "u").unwrap(), Parsed::Text(None));
    }
}
