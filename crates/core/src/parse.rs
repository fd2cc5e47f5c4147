//! Tolerant markup parsing.
//!
//! Every document, whether it is an HTML item page or an XML transcription,
//! goes through the HTML5 tree builder. Strict XML parsing of the legacy
//! transcription documents wraps them in spurious `html`/`body` elements and
//! then loses track of the nested `body` tags they contain; the HTML parser
//! keeps paragraph-level text blocks intact.
//!
//! # Example
//!
//! ```rust
//! use loctext_core::parse::Document;
//!
//! let doc = Document::parse("<p>Plain</p><p>Marked <b>up</b></p>");
//! let paragraphs = doc.select("p").unwrap();
//! assert_eq!(paragraphs[0].text_only(), Some("Plain".to_string()));
//! assert_eq!(paragraphs[1].text_only(), None);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{LoctextError, Result};

/// A parsed document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses markup with the HTML5 tree builder. Never fails; malformed
    /// input produces a best-effort tree.
    pub fn parse(markup: &str) -> Self {
        Self { html: Html::parse_document(markup) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`LoctextError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A single element of a parsed [`Document`].
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element and all its descendants.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text of this element when its children are all text nodes.
    ///
    /// Returns `None` when the element contains any child markup (elements,
    /// comments) or no text at all.
    pub fn text_only(&self) -> Option<String> {
        let mut text = String::new();
        for child in self.element.children() {
            text.push_str(child.value().as_text()?);
        }
        (!text.is_empty()).then_some(text)
    }

    /// Whether this element has at least one element child.
    pub fn has_child_elements(&self) -> bool {
        self.element.children().any(|child| child.value().is_element())
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|element| Element { element }).collect())
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| LoctextError::HtmlParseError(format!("Invalid selector: {}", e)))
}
