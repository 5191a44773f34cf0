//! HTML parser for extracting anchor targets
//!
//! This module only pulls raw `href` values out of a document. Resolution,
//! scope filtering and deduplication happen in the engine.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Every raw `<a href>` value, in document order, unfiltered and unnormalized
    pub hrefs: Vec<String>,
}

/// Parses HTML content and extracts the title and anchor targets
///
/// HTML parsing is error-tolerant: malformed markup yields whatever anchors
/// the parser could recover rather than an error.
///
/// # Example
///
/// ```
/// use sitewalk::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.hrefs, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        hrefs: extract_anchor_hrefs(&document),
    }
}

/// Convenience function for extracting just the raw hrefs from HTML
pub fn extract_hrefs(html: &str) -> Vec<String> {
    parse_html(html).hrefs
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_anchor_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
