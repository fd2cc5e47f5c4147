//! Item pages that offer the transcription as a download.
//!
//! The page lists download options tagged with a `data-file-download`
//! attribute. Text downloads are the ones whose tag mentions "text". When
//! there are several (one per page plus a combined file, typically), only a
//! single option labelled "all pages" is accepted; anything more is reported
//! rather than guessed.

use url::Url;

use super::{Candidates, Parsed, Strategy, Target};
use crate::endpoints::Endpoints;
use crate::extract::ParseMode;
use crate::parse::Document;
use crate::{LoctextError, Result};

const DOWNLOAD_ATTR: &str = "data-file-download";
const ALL_PAGES: &str = "all pages";

/// A text download offered on an item page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOption {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDownloadPage;

impl HtmlDownloadPage {
    /// Text download options on the page, in document order, with links
    /// resolved against `page_url`.
    pub fn text_downloads(body: &str, page_url: &str) -> Result<Vec<DownloadOption>> {
        let doc = Document::parse(body);
        let base = Url::parse(page_url).ok();

        let options = doc
            .select(&format!("[{DOWNLOAD_ATTR}]"))?
            .into_iter()
            .filter(|el| {
                el.attr(DOWNLOAD_ATTR)
                    .is_some_and(|kind| kind.to_lowercase().contains("text"))
            })
            .filter_map(|el| {
                let link = el.attr("value").or_else(|| el.attr("href"))?.trim();
                if link.is_empty() {
                    return None;
                }
                let url = match &base {
                    Some(base) => base.join(link).map(String::from).unwrap_or_else(|_| link.to_string()),
                    None => link.to_string(),
                };
                Some(DownloadOption { label: el.text().trim().to_string(), url })
            })
            .collect();

        Ok(options)
    }

    /// Picks the download to fetch.
    ///
    /// # Errors
    ///
    /// Returns [`LoctextError::AmbiguousText`] when more than one option is
    /// labelled "all pages".
    pub fn choose(options: Vec<DownloadOption>) -> Result<Option<DownloadOption>> {
        if options.len() <= 1 {
            return Ok(options.into_iter().next());
        }

        let mut all_pages: Vec<DownloadOption> = options
            .into_iter()
            .filter(|option| option.label.to_lowercase().contains(ALL_PAGES))
            .collect();

        match all_pages.len() {
            0 => Ok(None),
            1 => Ok(all_pages.pop()),
            count => Err(LoctextError::AmbiguousText { count }),
        }
    }
}

impl Strategy for HtmlDownloadPage {
    fn applies_to(&self, target: &Target<'_>, _endpoints: &Endpoints) -> bool {
        matches!(target, Target::ItemPage(_))
    }

    fn candidate_urls<'a>(&self, target: &Target<'a>, _endpoints: &'a Endpoints) -> Candidates<'a> {
        match target {
            Target::ItemPage(url) => Box::new(std::iter::once(Ok(url.to_string()))),
            Target::Record(_) => Box::new(std::iter::empty()),
        }
    }

    fn parse(&self, body: &str, source_url: &str) -> Result<Parsed> {
        let Some(option) = Self::choose(Self::text_downloads(body, source_url)?)? else {
            return Ok(Parsed::Text(None));
        };

        let mode = ParseMode::for_download(&option.url).ok_or_else(|| LoctextError::UnknownFormat(option.url.clone()))?;
        Ok(Parsed::Follow { url: option.url, mode })
    }
}
