//! Post models

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::Mapping;

use super::frontmatter::canonical_categories;

/// Canonical post metadata, produced by [`super::normalize`]
#[derive(Debug, Clone, PartialEq)]
pub struct PostMetadata {
    /// Never empty
    pub title: String,

    pub description: Option<String>,

    /// Publication date
    pub pub_date: DateTime<Utc>,

    /// Last updated date
    pub updated_date: Option<DateTime<Utc>>,

    /// Trimmed, deduplicated, in first-seen order; empty means uncategorized
    pub categories: Vec<String>,

    pub draft: bool,

    /// Custom frontmatter fields, kept in their original order
    pub extra: Mapping,
}

/// A post file with its parsed content
#[derive(Debug, Clone)]
pub struct Post {
    /// File stem; the post's identity
    pub slug: String,

    /// File name in the posts directory
    pub file: String,

    /// Normalized frontmatter
    pub metadata: PostMetadata,

    /// Markdown after the frontmatter block
    pub body: String,

    /// Whole decoded file text
    pub raw: String,
}

impl Post {
    /// Listing projection of this post
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            file: self.file.clone(),
            title: self.metadata.title.clone(),
            description: self.metadata.description.clone().unwrap_or_default(),
            categories: self.metadata.categories.clone(),
            pub_date: self.metadata.pub_date,
            updated_date: self.metadata.updated_date,
            draft: self.metadata.draft,
        }
    }
}

/// Row in the admin post listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub file: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(serialize_with = "crate::helpers::serialize_iso")]
    pub pub_date: DateTime<Utc>,
    #[serde(serialize_with = "crate::helpers::serialize_iso_opt")]
    pub updated_date: Option<DateTime<Utc>>,
    pub draft: bool,
}

/// Values supplied next to an upload that win over the file's frontmatter
#[derive(Debug, Clone, Default)]
pub struct FrontmatterOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma separated, like a `categories:` string in frontmatter
    pub categories: Option<String>,
}

impl FrontmatterOverrides {
    /// Apply every non-blank override to `meta`
    pub fn apply(&self, meta: &mut PostMetadata) {
        if let Some(title) = non_blank(&self.title) {
            meta.title = title.to_string();
        }
        if let Some(description) = non_blank(&self.description) {
            meta.description = Some(description.to_string());
        }
        if let Some(categories) = non_blank(&self.categories) {
            meta.categories = canonical_categories(categories.split([',', '，']));
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
