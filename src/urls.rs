//! URL canonicalization and site keying
//!
//! Listing sites decorate conference links with tracking parameters and
//! inconsistent host casing; canonicalizing before comparison keeps the
//! dedup key and the pacing state stable across sources.

use crate::UrlError;
use url::Url;

/// Query parameters stripped during canonicalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Canonicalizes a conference website URL
///
/// Rules: http(s) only, lowercased host, `www.` prefix removed, fragment
/// dropped, tracking parameters (`utm_*` and a short known list) removed,
/// remaining query parameters sorted so equivalent URLs compare equal.
///
/// # Examples
///
/// ```
/// use confscout::canonicalize_url;
///
/// let url = canonicalize_url("https://WWW.AISummit.org/2025?utm_source=x").unwrap();
/// assert_eq!(url.as_str(), "https://aisummit.org/2025");
/// ```
pub fn canonicalize_url(raw: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort();

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    Ok(url)
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

/// Canonicalizes an already-parsed URL, leaving it unchanged on failure
pub fn canonicalize(url: &Url) -> Url {
    canonicalize_url(url.as_str()).unwrap_or_else(|_| url.clone())
}

/// Returns the pacing/identity key for a URL: the lowercased host, plus the
/// port when one is explicit
///
/// Including the port keeps two local test servers on the same host apart;
/// for real sites the key is simply the domain.
pub fn site_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// True when `url` points at a different site than `base`
pub fn is_offsite(url: &Url, base: &Url) -> bool {
    match (site_key(url), site_key(base)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_host_and_strip_www() {
        let url = canonicalize_url("https://WWW.Example.COM/Page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_scheme_preserved() {
        let url = canonicalize_url("http://example.com/").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_reject_non_http() {
        assert!(matches!(
            canonicalize_url("ftp://example.com/"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_strip_fragment() {
        let url = canonicalize_url("https://example.com/page#speakers").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_strip_tracking_params() {
        let url =
            canonicalize_url("https://example.com/event?utm_campaign=x&fbclid=y&id=7").unwrap();
        assert_eq!(url.as_str(), "https://example.com/event?id=7");
    }

    #[test]
    fn test_sort_query_params() {
        let url = canonicalize_url("https://example.com/e?b=2&a=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/e?a=1&b=2");
    }

    #[test]
    fn test_site_key_with_port() {
        let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(site_key(&url).unwrap(), "127.0.0.1:8080");
    }

    #[test]
    fn test_site_key_without_port() {
        let url = Url::parse("https://Example.com/page").unwrap();
        assert_eq!(site_key(&url).unwrap(), "example.com");
    }

    #[test]
    fn test_is_offsite() {
        let base = Url::parse("https://listing.com/event/1").unwrap();
        let same = Url::parse("https://listing.com/about").unwrap();
        let other = Url::parse("https://ai-summit.org/").unwrap();

        assert!(!is_offsite(&same, &base));
        assert!(is_offsite(&other, &base));
    }

    #[test]
    fn test_malformed_url() {
        assert!(canonicalize_url("not a url").is_err());
    }
}
