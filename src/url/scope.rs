use crate::UrlError;
use url::{ParseError, Url};

/// Parses and validates a seed URL
///
/// A seed must be an absolute URL with both a scheme and a host.
///
/// # Examples
///
/// ```
/// use sitewalk::url::parse_seed;
///
/// let seed = parse_seed("http://x.test").unwrap();
/// assert_eq!(seed.as_str(), "http://x.test/");
///
/// assert!(parse_seed("x.test/page").is_err());
/// assert!(parse_seed("mailto:someone@x.test").is_err());
/// ```
pub fn parse_seed(seed: &str) -> Result<Url, UrlError> {
    let url = Url::parse(seed).map_err(|e| match e {
        ParseError::RelativeUrlWithoutBase => UrlError::MissingScheme(seed.to_string()),
        other => UrlError::Parse {
            url: seed.to_string(),
            reason: other.to_string(),
        },
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost(seed.to_string())),
    }
}

/// The in-scope predicate of a crawl
///
/// A URL is in scope when its string form starts with the seed's canonical
/// serialization. The comparison is exact: case-sensitive, with no trailing
/// slash adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    origin: String,
}

impl Scope {
    /// Creates the scope rooted at the given seed URL
    pub fn new(seed: &Url) -> Self {
        Self {
            origin: seed.as_str().to_string(),
        }
    }

    /// Returns the prefix every in-scope URL starts with
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns true if the absolute URL lies within this scope
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_canonicalizes() {
        let seed = parse_seed("http://x.test").unwrap();
        assert_eq!(seed.as_str(), "http://x.test/");
    }

    #[test]
    fn test_parse_seed_with_path() {
        let seed = parse_seed("https://x.test/docs/").unwrap();
        assert_eq!(seed.as_str(), "https://x.test/docs/");
    }

    #[test]
    fn test_parse_seed_empty() {
        assert!(parse_seed("").is_err());
    }

    #[test]
    fn test_parse_seed_relative() {
        assert!(matches!(
            parse_seed("/just/a/path"),
            Err(UrlError::MissingScheme(_))
        ));
    }

    #[test]
    fn test_parse_seed_without_host() {
        assert!(matches!(
            parse_seed("mailto:someone@x.test"),
            Err(UrlError::MissingHost(_))
        ));
    }

    #[test]
    fn test_parse_seed_malformed() {
        assert!(matches!(
            parse_seed("http://[::1"),
            Err(UrlError::Parse { .. })
        ));
    }

    #[test]
    fn test_scope_contains() {
        let scope = Scope::new(&parse_seed("http://x.test/").unwrap());
        assert!(scope.contains("http://x.test/"));
        assert!(scope.contains("http://x.test/a/b?c=d"));
        assert!(!scope.contains("http://other.test/"));
        assert!(!scope.contains("https://x.test/"));
    }

    #[test]
    fn test_scope_is_case_sensitive() {
        let scope = Scope::new(&parse_seed("http://x.test/Docs").unwrap());
        assert!(scope.contains("http://x.test/Docs/page"));
        assert!(!scope.contains("http://x.test/docs/page"));
    }

    #[test]
    fn test_scope_is_plain_prefix() {
        let scope = Scope::new(&parse_seed("http://x.test/docs").unwrap());
        assert!(scope.contains("http://x.test/docs-archive"));
    }
}
