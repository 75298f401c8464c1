//! categories.json - category counts over published posts

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{public_posts, RenderedView};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;
use crate::taxonomy::{aggregate, CategoryCount};

#[derive(Debug, Serialize)]
pub struct CategoryListing {
    pub categories: Vec<CategoryCount>,
}

pub fn build(posts: &[Post]) -> CategoryListing {
    CategoryListing {
        categories: aggregate(public_posts(posts).into_iter().map(|p| &p.metadata)),
    }
}

pub fn view(_config: &SiteConfig, posts: &[Post], _generated_at: DateTime<Utc>) -> Result<RenderedView> {
    Ok(RenderedView {
        file_name: "categories.json",
        content_type: "application/json; charset=utf-8",
        body: serde_json::to_string(&build(posts))?,
    })
}
