//! Transcription text extraction.
//!
//! Transcriptions arrive in one of three shapes: paragraph-structured XML
//! (legacy host and linked resources), ALTO XML from the tile text service
//! (returned as-is), or plain text downloads.

use crate::parse::{Document, Element};

/// UTF-8 curly double quotes as read under a Latin-1 or windows-1252 charset.
const MISDECODED_QUOTES: [&str; 4] = [
    "\u{e2}\u{80}\u{9c}",
    "\u{e2}\u{80}\u{9d}",
    "\u{e2}\u{20ac}\u{153}",
    "\u{e2}\u{20ac}\u{9d}",
];

/// How a fetched body is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Paragraph text from an XML document, parsed tolerantly.
    XmlLike,
    /// The body unchanged.
    Raw,
    /// A plain text file.
    PlainText,
}

impl ParseMode {
    /// Picks the mode for a download link from its file extension.
    ///
    /// Returns `None` for anything other than `.xml` or `.txt`.
    pub fn for_download(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
        if extension.contains('/') {
            return None;
        }

        match extension.as_str() {
            "xml" => Some(Self::XmlLike),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Applies this mode to a response body. Empty results are `None`.
    pub fn apply(self, body: &str) -> Option<String> {
        let text = match self {
            Self::XmlLike => parse_xml_like(body),
            Self::Raw => body.to_string(),
            Self::PlainText => normalize_quotes(body),
        };

        (!text.trim().is_empty()).then_some(text)
    }
}

/// Collects the text of every paragraph under `body` that has no child
/// markup, one paragraph per line.
///
/// Paragraphs with child elements hold page metadata (`pageinfo` and the
/// like) rather than transcribed text, and are skipped.
pub fn parse_xml_like(body: &str) -> String {
    let doc = Document::parse(body);
    let paragraphs = match doc.select("body p") {
        Ok(paragraphs) => paragraphs,
        Err(_) => return String::new(),
    };

    let text = paragraphs
        .iter()
        .filter_map(Element::text_only)
        .collect::<Vec<_>>()
        .join("\n");

    normalize_quotes(&text)
}

/// Replaces mis-decoded curly double quotes with ASCII `"`.
pub fn normalize_quotes(text: &str) -> String {
    MISDECODED_QUOTES
        .iter()
        .fold(text.to_string(), |acc, pattern| acc.replace(pattern, "\""))
}
