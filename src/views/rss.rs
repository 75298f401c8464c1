//! RSS 2.0 feed

use chrono::{DateTime, Utc};

use super::{escape_xml, public_posts, RenderedView};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;
use crate::helpers::{full_url_for, post_url, to_rfc2822};

/// One feed entry
#[derive(Debug, Clone, PartialEq)]
pub struct RssItem {
    pub title: String,
    pub description: String,
    pub pub_date: DateTime<Utc>,
    pub link: String,
    pub categories: Vec<String>,
}

/// Feed items for every non-draft post, newest first
pub fn items(config: &SiteConfig, posts: &[Post]) -> Vec<RssItem> {
    public_posts(posts)
        .into_iter()
        .map(|post| RssItem {
            title: post.metadata.title.clone(),
            description: post.metadata.description.clone().unwrap_or_default(),
            pub_date: post.metadata.pub_date,
            link: post_url(config, &post.slug),
            categories: post.metadata.categories.clone(),
        })
        .collect()
}

/// Render the feed document
pub fn render(config: &SiteConfig, items: &[RssItem], generated_at: DateTime<Utc>) -> String {
    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    feed.push('\n');
    feed.push_str(r#"<rss version="2.0">"#);
    feed.push('\n');
    feed.push_str("  <channel>\n");
    feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&config.title)));
    feed.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&config.description)
    ));
    feed.push_str(&format!(
        "    <link>{}</link>\n",
        escape_xml(&full_url_for(config, "/"))
    ));
    if !config.language.is_empty() {
        feed.push_str(&format!(
            "    <language>{}</language>\n",
            escape_xml(&config.language)
        ));
    }
    feed.push_str(&format!(
        "    <lastBuildDate>{}</lastBuildDate>\n",
        to_rfc2822(&generated_at)
    ));

    for item in items {
        let link = escape_xml(&item.link);
        feed.push_str("    <item>\n");
        feed.push_str(&format!("      <title>{}</title>\n", escape_xml(&item.title)));
        feed.push_str(&format!("      <link>{}</link>\n", link));
        feed.push_str(&format!(
            "      <guid isPermaLink=\"true\">{}</guid>\n",
            link
        ));
        feed.push_str(&format!(
            "      <description>{}</description>\n",
            escape_xml(&item.description)
        ));
        feed.push_str(&format!(
            "      <pubDate>{}</pubDate>\n",
            to_rfc2822(&item.pub_date)
        ));
        for category in &item.categories {
            feed.push_str(&format!("      <category>{}</category>\n", escape_xml(category)));
        }
        feed.push_str("    </item>\n");
    }

    feed.push_str("  </channel>\n");
    feed.push_str("</rss>\n");
    feed
}

pub fn view(config: &SiteConfig, posts: &[Post], generated_at: DateTime<Utc>) -> Result<RenderedView> {
    Ok(RenderedView {
        file_name: "rss.xml",
        content_type: "application/rss+xml; charset=utf-8",
        body: render(config, &items(config, posts), generated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::post;
    use chrono::TimeZone;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Notes & Things".to_string(),
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_items_skip_drafts_newest_first() {
        let posts = vec![
            post("first", 1, &[], false, ""),
            post("secret", 3, &[], true, ""),
            post("second", 2, &[], false, ""),
        ];
        let items = items(&config(), &posts);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link, "https://example.com/blog/posts/second/");
        assert_eq!(items[1].link, "https://example.com/blog/posts/first/");
        assert_eq!(items[0].description, "");
    }

    #[test]
    fn test_render_feed() {
        let config = config();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let posts = vec![post("hello", 15, &["Tech"], false, "")];
        let xml = render(&config, &items(&config, &posts), now);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<title>Notes &amp; Things</title>"));
        assert!(xml.contains("<link>https://example.com/blog/</link>"));
        assert!(xml.contains("<pubDate>Mon, 15 Jan 2024 08:00:00 +0000</pubDate>"));
        assert!(xml.contains("<category>Tech</category>"));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn test_non_ascii_slug_is_encoded() {
        let posts = vec![post("你好", 1, &[], false, "")];
        let items = items(&config(), &posts);
        assert_eq!(
            items[0].link,
            "https://example.com/blog/posts/%E4%BD%A0%E5%A5%BD/"
        );
    }
}
