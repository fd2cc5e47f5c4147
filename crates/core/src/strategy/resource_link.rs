//! Records that link their transcription directly.

use super::{Candidates, Parsed, Strategy, Target};
use crate::Result;
use crate::endpoints::Endpoints;
use crate::extract::ParseMode;

/// Fetches the `fulltext_file` of each resource, in record order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceLink;

impl Strategy for ResourceLink {
    fn applies_to(&self, target: &Target<'_>, _endpoints: &Endpoints) -> bool {
        target
            .record()
            .is_some_and(|record| record.fulltext_files().next().is_some())
    }

    fn candidate_urls<'a>(&self, target: &Target<'a>, _endpoints: &'a Endpoints) -> Candidates<'a> {
        match target.record() {
            Some(record) => Box::new(record.fulltext_files().map(|url| Ok(url.to_string()))),
            None => Box::new(std::iter::empty()),
        }
    }

    fn parse(&self, body: &str, _source_url: &str) -> Result<Parsed> {
        Ok(Parsed::Text(ParseMode::XmlLike.apply(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use serde_json::json;

    fn record() -> Record {
        Record::from_value(json!({
            "id": "abc",
            "online_format": ["image"],
            "resources": [
                {"image": "https://example.org/a.jpg"},
                {"fulltext_file": "https://example.org/one.xml"},
                {"fulltext_file": "https://example.org/two.xml"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_applies_with_fulltext_file() {
        let record = record();
        assert!(ResourceLink.applies_to(&Target::Record(&record), &Endpoints::default()));

        let bare = Record::from_value(json!({"online_format": "image", "resources": [{}]})).unwrap();
        assert!(!ResourceLink.applies_to(&Target::Record(&bare), &Endpoints::default()));
    }

    #[test]
    fn test_candidates_in_record_order() {
        let record = record();
        let endpoints = Endpoints::default();
        let urls: Vec<String> = ResourceLink
            .candidate_urls(&Target::Record(&record), &endpoints)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(urls, vec!["https://example.org/one.xml", "https://example.org/two.xml"]);
    }

    #[test]
    fn test_parse_reads_paragraphs() {
        let parsed = ResourceLink.parse("<doc><p>Line</p></doc>", "https://example.org/one.xml").unwrap();
        assert_eq!(parsed, Parsed::Text(Some("Line".to_string())));
    }
}
