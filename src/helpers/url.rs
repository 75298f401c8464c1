//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'|');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/sitemap.xml") // -> "/blog/sitemap.xml"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim().trim_end_matches('/');
    let root = if root.is_empty() || root.starts_with('/') {
        root.to_string()
    } else {
        format!("/{}", root)
    };
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the site origin
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim().trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Site-relative path of a post page
pub fn post_path(slug: &str) -> String {
    format!("posts/{}/", encode_segment(slug))
}

/// Absolute URL of a post page
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    full_url_for(config, &post_path(slug))
}

/// Percent-encode one path segment (non-ASCII included)
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/sitemap.xml"), "/blog/sitemap.xml");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, "/"), "/blog/");
    }

    #[test]
    fn test_url_for_root_variants() {
        let mut config = test_config();
        config.root = String::new();
        assert_eq!(url_for(&config, "posts/"), "/posts/");
        config.root = "repo".to_string();
        assert_eq!(url_for(&config, "posts/"), "/repo/posts/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/blog/about/"
        );
    }

    #[test]
    fn test_post_url_encodes_slug() {
        let config = test_config();
        assert_eq!(
            post_url(&config, "hello world"),
            "https://example.com/blog/posts/hello%20world/"
        );
        assert_eq!(
            post_url(&config, "你好"),
            "https://example.com/blog/posts/%E4%BD%A0%E5%A5%BD/"
        );
    }
}
