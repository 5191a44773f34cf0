use url::{ParseError, Url};

/// Resolves an href found on a page into an absolute URL string
///
/// # Resolution Steps
///
/// 1. Parse the href on its own; if it is already absolute, return its
///    canonical serialization
/// 2. If it is relative (path-only, query-only, fragment, protocol-relative),
///    resolve it against `page_url` using RFC 3986 reference resolution
/// 3. Anything else that fails to parse is discarded
///
/// The function has no side effects and never reports an error: malformed
/// hrefs are common in real HTML and are simply dropped by the caller.
///
/// # Arguments
///
/// * `page_url` - The absolute URL of the page the href was found on
/// * `href` - The raw `href` attribute value
///
/// # Returns
///
/// * `Some(String)` - The absolute URL
/// * `None` - The href (or the page URL, for a relative href) is invalid
///
/// # Examples
///
/// ```
/// use sitewalk::url::normalize_link;
///
/// assert_eq!(
///     normalize_link("http://x.test/docs/intro", "../about").as_deref(),
///     Some("http://x.test/about")
/// );
/// assert_eq!(
///     normalize_link("http://x.test/", "https://other.test/a").as_deref(),
///     Some("https://other.test/a")
/// );
/// assert_eq!(normalize_link("http://x.test/", "http://[::1"), None);
/// ```
pub fn normalize_link(page_url: &str, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(absolute) => Some(absolute.into()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(page_url).ok()?;
            base.join(href).ok().map(String::from)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "http://x.test/a/b";

    #[test]
    fn test_absolute_link_unchanged() {
        let result = normalize_link(PAGE, "http://x.test/other?q=1").unwrap();
        assert_eq!(result, "http://x.test/other?q=1");
    }

    #[test]
    fn test_absolute_link_canonical_serialization() {
        let result = normalize_link(PAGE, "HTTP://X.TEST").unwrap();
        assert_eq!(result, "http://x.test/");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_link(PAGE, "/c/../d").unwrap();
        let twice = normalize_link(PAGE, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_root_relative_path() {
        let result = normalize_link(PAGE, "/a").unwrap();
        assert_eq!(result, "http://x.test/a");
    }

    #[test]
    fn test_relative_path() {
        let result = normalize_link(PAGE, "c").unwrap();
        assert_eq!(result, "http://x.test/a/c");
    }

    #[test]
    fn test_parent_directory() {
        let result = normalize_link(PAGE, "../c").unwrap();
        assert_eq!(result, "http://x.test/c");
    }

    #[test]
    fn test_query_only() {
        let result = normalize_link(PAGE, "?page=2").unwrap();
        assert_eq!(result, "http://x.test/a/b?page=2");
    }

    #[test]
    fn test_fragment_only_keeps_fragment() {
        let result = normalize_link(PAGE, "#section").unwrap();
        assert_eq!(result, "http://x.test/a/b#section");
    }

    #[test]
    fn test_protocol_relative() {
        let result = normalize_link("https://x.test/", "//other.test/p").unwrap();
        assert_eq!(result, "https://other.test/p");
    }

    #[test]
    fn test_other_scheme_is_absolute() {
        let result = normalize_link(PAGE, "mailto:someone@x.test").unwrap();
        assert_eq!(result, "mailto:someone@x.test");
    }

    #[test]
    fn test_invalid_href() {
        assert_eq!(normalize_link(PAGE, "http://[::1"), None);
        assert_eq!(normalize_link(PAGE, "http://"), None);
    }

    #[test]
    fn test_relative_href_with_invalid_page() {
        assert_eq!(normalize_link("not a url", "/a"), None);
    }
}
