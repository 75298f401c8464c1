//! sitemap.xml

use chrono::{DateTime, Utc};

use super::{escape_xml, public_posts, RenderedView};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;
use crate::helpers::{full_url_for, post_path, to_iso};

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
}

/// Static routes first, then every non-draft post
pub fn entries(config: &SiteConfig, posts: &[Post], generated_at: DateTime<Utc>) -> Vec<SitemapEntry> {
    let statics = config.static_routes.iter().map(|route| SitemapEntry {
        loc: full_url_for(config, route),
        lastmod: generated_at,
    });

    let pages = public_posts(posts).into_iter().map(|post| SitemapEntry {
        loc: full_url_for(config, &post_path(&post.slug)),
        lastmod: post.metadata.updated_date.unwrap_or(post.metadata.pub_date),
    });

    statics.chain(pages).collect()
}

pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", to_iso(&entry.lastmod)));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

pub fn view(config: &SiteConfig, posts: &[Post], generated_at: DateTime<Utc>) -> Result<RenderedView> {
    Ok(RenderedView {
        file_name: "sitemap.xml",
        content_type: "application/xml; charset=utf-8",
        body: render(&entries(config, posts, generated_at)),
    })
}
