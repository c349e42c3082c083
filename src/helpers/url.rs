//! URL helper functions

use axum::http::HeaderValue;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Path of a post page
///
/// # Examples
/// ```ignore
/// post_path("como-utilizar-hooks") // -> "/post/como-utilizar-hooks"
/// ```
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", encode_segment(uid))
}

/// Path of an accumulated listing page (page 1 is the site root)
pub fn listing_path(page: usize) -> String {
    if page <= 1 {
        "/".to_string()
    } else {
        format!("/page/{}/", page)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/abc") // -> "https://example.com/post/abc"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Redirect target for a caller-supplied return URL
///
/// Only same-site absolute paths that fit in a `Location` header are
/// honoured; anything else (including protocol-relative `//host` URLs)
/// falls back to the site root.
pub fn redirect_target(current_url: Option<&str>) -> String {
    match current_url {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.starts_with("/\\")
                && HeaderValue::from_str(url).is_ok() =>
        {
            url.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("como-utilizar-hooks"), "/post/como-utilizar-hooks");
        assert_eq!(post_path("a b/c"), "/post/a%20b%2Fc");
    }

    #[test]
    fn test_listing_path() {
        assert_eq!(listing_path(1), "/");
        assert_eq!(listing_path(3), "/page/3/");
    }

    #[test]
    fn test_full_url_for() {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        assert_eq!(
            full_url_for(&config, "/post/abc"),
            "https://example.com/post/abc"
        );
    }

    #[test]
    fn test_redirect_target() {
        assert_eq!(redirect_target(Some("/post/abc")), "/post/abc");
        assert_eq!(redirect_target(None), "/");
        assert_eq!(redirect_target(Some("")), "/");
        assert_eq!(redirect_target(Some("https://evil.example")), "/");
        assert_eq!(redirect_target(Some("//evil.example")), "/");
    }

    #[test]
    fn test_redirect_target_rejects_control_characters() {
        assert_eq!(redirect_target(Some("/post\nabc")), "/");
        assert_eq!(redirect_target(Some("/post\r\nSet-Cookie: a=b")), "/");
        assert_eq!(redirect_target(Some("/post\0abc")), "/");
        assert_eq!(redirect_target(Some("/post/café")), "/post/café");
    }
}
