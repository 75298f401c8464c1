//! Derived views - feeds and indexes computed from posts
//!
//! Every builder is a pure function of the site config, the posts and a
//! timestamp. `commands::build` writes them to the public directory and the
//! admin server computes them per request.

pub mod categories;
pub mod robots;
pub mod rss;
pub mod search;
pub mod sitemap;

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;

/// A rendered view, ready to be written or served
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// File name under the public directory, also the served path
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

/// Signature shared by all view builders
pub type ViewBuilder = fn(&SiteConfig, &[Post], DateTime<Utc>) -> Result<RenderedView>;

/// Every published view with the file name it is written and served as
pub const VIEWS: [(&str, ViewBuilder); 5] = [
    ("rss.xml", rss::view),
    ("sitemap.xml", sitemap::view),
    ("search.json", search::view),
    ("robots.txt", robots::view),
    ("categories.json", categories::view),
];

/// Render every published view
pub fn render_all(
    config: &SiteConfig,
    posts: &[Post],
    generated_at: DateTime<Utc>,
) -> Result<Vec<RenderedView>> {
    VIEWS
        .iter()
        .map(|(_, build)| build(config, posts, generated_at))
        .collect()
}

/// Non-draft posts, newest first
pub fn public_posts(posts: &[Post]) -> Vec<&Post> {
    let mut public: Vec<&Post> = posts.iter().filter(|p| !p.metadata.draft).collect();
    public.sort_by(|a, b| b.metadata.pub_date.cmp(&a.metadata.pub_date));
    public
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    strip_invalid_xml_chars(s)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::content::{Post, PostMetadata};
    use chrono::{TimeZone, Utc};
    use serde_yaml::Mapping;

    pub fn post(slug: &str, day: u32, categories: &[&str], draft: bool, body: &str) -> Post {
        Post {
            slug: slug.to_string(),
            file: format!("{}.md", slug),
            metadata: PostMetadata {
                title: format!("Title {}", slug),
                description: None,
                pub_date: Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap(),
                updated_date: None,
                categories: categories.iter().map(|c| c.to_string()).collect(),
                draft,
                extra: Mapping::new(),
            },
            body: body.to_string(),
            raw: body.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::post;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_public_posts_order_and_drafts() {
        let posts = vec![
            post("old", 1, &[], false, ""),
            post("draft", 9, &[], true, ""),
            post("new", 5, &[], false, ""),
        ];
        let slugs: Vec<_> = public_posts(&posts).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & <b>"), "a &amp; &lt;b&gt;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }

    #[test]
    fn test_render_all_file_names() {
        let config = SiteConfig::default();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let views = render_all(&config, &[post("a", 1, &["Tech"], false, "hi")], now).unwrap();
        let names: Vec<_> = views.iter().map(|v| v.file_name).collect();
        let expected: Vec<_> = VIEWS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, expected);
        assert!(views[3].body.starts_with("User-agent: *"));
    }
}
