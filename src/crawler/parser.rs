//! HTML page capability
//!
//! This module defines the [`Page`] capability the scanner consumes and its
//! HTML implementation, which extracts:
//! - The page title
//! - Links to follow (from `<a href>` tags), resolved and normalized

use crate::url::normalize_parsed;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A fetched page, as seen by the scanner
///
/// No ordering guarantee is required of [`Page::links`]; each returned URL is
/// treated as an independent candidate.
pub trait Page: Send + Sync {
    /// The page title, or an empty string if it has none
    fn title(&self) -> String;

    /// Outbound links found on the page
    fn links(&self) -> Vec<String>;
}

/// A parsed HTML document
///
/// `scraper::Html` is not `Send`, so title and links are extracted eagerly and
/// the document itself is dropped before the page crosses an await point.
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    title: String,
    links: Vec<String>,
}

impl HtmlPage {
    /// Parses HTML content, resolving relative links against `base_url`
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href="...">` tags anywhere in the document
    ///
    /// **Exclude:**
    /// - `<a href="..." download>`
    /// - `javascript:`, `mailto:`, `tel:` links and data URIs
    /// - Fragment-only links (same page anchors)
    /// - Anything that is not HTTP(S) after resolution
    ///
    /// Each distinct normalized link is reported once, in document order.
    ///
    /// # Example
    ///
    /// ```
    /// use depthwalk::crawler::{HtmlPage, Page};
    /// use url::Url;
    ///
    /// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
    /// let base_url = Url::parse("https://example.com/").unwrap();
    /// let page = HtmlPage::parse(html, &base_url);
    /// assert_eq!(page.title(), "Test");
    /// assert_eq!(page.links(), vec!["https://example.com/page".to_string()]);
    /// ```
    pub fn parse(html: &str, base_url: &Url) -> Self {
        let document = Html::parse_document(html);

        Self {
            title: extract_title(&document),
            links: extract_links(&document, base_url),
        }
    }
}

impl Page for HtmlPage {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn links(&self) -> Vec<String> {
        self.links.clone()
    }
}

/// Extracts the trimmed text of the first `<title>` element
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts all followable links from the document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    normalize_parsed(absolute_url)
        .ok()
        .map(|url| url.to_string())
}
