// Facebook page URL helpers
// Identifier derivation for the Graph API and URL-only parsing

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_.-]+$").unwrap());

/// Parse a URL, accepting scheme-less input like "facebook.com/nike"
pub fn parse_loose(input: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    Url::parse(input)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", input)).ok())
        .filter(|u| u.host_str().is_some())
}

/// facebook.com or any subdomain of it
pub fn is_facebook_dot_com(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "facebook.com" || host.ends_with(".facebook.com")
}

/// facebook.com, fb.com, or subdomains of either
pub fn is_facebook_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    is_facebook_dot_com(&host) || host == "fb.com" || host.ends_with(".fb.com")
}

/// Host check on a raw URL string
pub fn is_facebook_url(input: &str) -> bool {
    parse_loose(input)
        .and_then(|u| u.host_str().map(is_facebook_host))
        .unwrap_or(false)
}

/// Page identifier for a Graph API lookup
///
/// Handles `/profile.php?id=N`, a numeric trailing segment
/// (`/pages/Name/123`), and vanity usernames (`/nike`).
/// Only facebook.com hosts yield an identifier.
pub fn derive_page_identifier(input: &str) -> Option<String> {
    let url = parse_loose(input)?;
    if !is_facebook_dot_com(url.host_str()?) {
        return None;
    }

    let path = url.path().trim_end_matches('/');

    if path.contains("/profile.php") {
        if let Some(id) = query_id(&url) {
            return Some(id);
        }
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.last()?;
    if NUMERIC_ID.is_match(last) {
        return Some(last.to_string());
    }

    Some(segments[0].to_string())
}

/// Identifier for URL-only parsing: the final path segment
///
/// `profile.php?id=N` yields `N` rather than "profile.php".
pub fn identifier_from_url(input: &str) -> Option<String> {
    let url = parse_loose(input)?;
    if !is_facebook_host(url.host_str()?) {
        return None;
    }

    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    let last = *segments.last()?;

    if last == "profile.php" {
        return query_id(&url);
    }

    urlencoding::decode(last)
        .map(|s| s.into_owned())
        .ok()
        .or_else(|| Some(last.to_string()))
}

/// Looks machine generated: lowercase letters, digits, `.`, `_`, `-` only
pub fn looks_like_username(identifier: &str) -> bool {
    USERNAME.is_match(identifier)
}

/// Mobile variant of a facebook.com URL (m.facebook.com)
///
/// Other hosts come back unchanged.
pub fn mobile_url(input: &str) -> Option<String> {
    let mut url = parse_loose(input)?;
    let host = url.host_str()?.to_ascii_lowercase();
    if !is_facebook_dot_com(&host) || host == "m.facebook.com" {
        return Some(url.to_string());
    }

    url.set_host(Some("m.facebook.com")).ok()?;
    Some(url.to_string())
}

fn query_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == "id" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_vanity_username() {
        assert_eq!(
            derive_page_identifier("https://www.facebook.com/nike/"),
            Some("nike".to_string())
        );
        assert_eq!(derive_page_identifier("facebook.com/nike"), Some("nike".to_string()));
    }

    #[test]
    fn test_derive_numeric_trailing_segment() {
        assert_eq!(
            derive_page_identifier("https://www.facebook.com/pages/Some-Business/123456789"),
            Some("123456789".to_string())
        );
    }

    #[test]
    fn test_derive_profile_php() {
        assert_eq!(
            derive_page_identifier("https://www.facebook.com/profile.php?id=555"),
            Some("555".to_string())
        );
    }

    #[test]
    fn test_derive_rejects_other_hosts() {
        assert_eq!(derive_page_identifier("https://example.com/nike"), None);
        assert_eq!(derive_page_identifier("https://notfacebook.com/nike"), None);
        assert_eq!(derive_page_identifier("https://www.facebook.com/"), None);
        assert_eq!(derive_page_identifier(""), None);
    }

    #[test]
    fn test_identifier_from_url() {
        assert_eq!(
            identifier_from_url("https://fb.com/joes.pizza"),
            Some("joes.pizza".to_string())
        );
        assert_eq!(
            identifier_from_url("https://m.facebook.com/profile.php?id=42"),
            Some("42".to_string())
        );
        assert_eq!(
            identifier_from_url("https://www.facebook.com/pages/Some-Business/987/"),
            Some("987".to_string())
        );
        assert_eq!(identifier_from_url("https://example.com/joes"), None);
    }

    #[test]
    fn test_looks_like_username() {
        assert!(looks_like_username("joes.pizza_22"));
        assert!(!looks_like_username("JoesPizza"));
        assert!(!looks_like_username("Joe's Pizza"));
    }

    #[test]
    fn test_mobile_url() {
        assert_eq!(
            mobile_url("https://www.facebook.com/nike"),
            Some("https://m.facebook.com/nike".to_string())
        );
        assert_eq!(
            mobile_url("https://fb.com/nike"),
            Some("https://fb.com/nike".to_string())
        );
    }

    #[test]
    fn test_host_checks() {
        assert!(is_facebook_url("https://business.facebook.com/x"));
        assert!(is_facebook_url("fb.com/x"));
        assert!(!is_facebook_url("https://example.org"));
        assert!(!is_facebook_url("not a url at all"));
    }
}
