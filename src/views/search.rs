//! search.json - plain-text index for client-side search

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::{public_posts, RenderedView};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```[\s\S]*?```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`[^`]*`").unwrap();
    static ref IMAGE: Regex = Regex::new(r"!\[[^\]]*?\]\([^)]+\)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[[^\]]*?\]\([^)]+\)").unwrap();
    static ref HEADING: Regex = Regex::new(r"#+\s+").unwrap();
    static ref QUOTE: Regex = Regex::new(r">\s+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(serialize_with = "crate::helpers::serialize_iso")]
    pub pub_date: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchIndex {
    pub items: Vec<SearchItem>,
}

/// Reduce Markdown to searchable plain text
///
/// Code, images and links are dropped entirely, heading and quote markers
/// removed, and whitespace collapsed.
pub fn strip_markdown(markdown: &str) -> String {
    let text = CODE_FENCE.replace_all(markdown, " ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = IMAGE.replace_all(&text, " ");
    let text = LINK.replace_all(&text, " ");
    let text = HEADING.replace_all(&text, " ");
    let text = QUOTE.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Build the index over non-draft posts, newest first
pub fn build(config: &SiteConfig, posts: &[Post]) -> SearchIndex {
    let items = public_posts(posts)
        .into_iter()
        .map(|post| SearchItem {
            slug: post.slug.clone(),
            title: post.metadata.title.clone(),
            description: post.metadata.description.clone().unwrap_or_default(),
            categories: post.metadata.categories.clone(),
            pub_date: post.metadata.pub_date,
            text: strip_markdown(&post.body)
                .chars()
                .take(config.search_text_limit)
                .collect(),
        })
        .collect();
    SearchIndex { items }
}

pub fn view(config: &SiteConfig, posts: &[Post], _generated_at: DateTime<Utc>) -> Result<RenderedView> {
    Ok(RenderedView {
        file_name: "search.json",
        content_type: "application/json; charset=utf-8",
        body: serde_json::to_string(&build(config, posts))?,
    })
}
