//! Category index
//!
//! Categories are not stored anywhere on their own; they only exist in post
//! frontmatter. Counting walks every post, and renaming or deleting a
//! category rewrites each affected post file one at a time.

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

use crate::content::{canonical_categories, PostMetadata, PostRepository};
use crate::error::{BlogError, Result};
use crate::storage::Storage;

/// Display label for posts without categories; never written to a file
pub const UNCATEGORIZED: &str = "未分类";

/// A category and the number of posts in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Result of a bulk category rewrite
///
/// Rewrites are not atomic: posts rewritten before a failure stay rewritten,
/// and every failure is listed here instead of aborting the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRewrite {
    pub changed_count: usize,
    pub failures: Vec<RewriteFailure>,
}

/// A post that could not be rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteFailure {
    pub slug: String,
    pub reason: String,
}

/// Count posts per category, most used first
///
/// A post counts once for each of its categories, or once for
/// [`UNCATEGORIZED`] when it has none.
pub fn aggregate<'a, I>(posts: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a PostMetadata>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();

    for meta in posts {
        let categories = canonical_categories(&meta.categories);
        if categories.is_empty() {
            *counts.entry(UNCATEGORIZED.to_string()).or_insert(0) += 1;
        }
        for category in categories {
            *counts.entry(category).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount { name, count })
        .collect();
    let collator = name_collator();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| compare_names(collator.as_ref(), &a.name, &b.name))
    });
    entries
}

/// Chinese collation (pinyin order) for category names
fn name_collator() -> Option<Collator> {
    match Collator::try_new(&locale!("zh").into(), CollatorOptions::new()) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("zh collation unavailable, ordering by code point: {:?}", e);
            None
        }
    }
}

/// Tie-break order for category names: collated, then exact
fn compare_names(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    let collated = match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    };
    collated.then_with(|| a.cmp(b))
}

/// Replace `from` with `to` (or drop it when `to` is blank)
///
/// The result is canonical and never contains [`UNCATEGORIZED`].
fn replace_category(categories: &[String], from: &str, to: &str) -> Vec<String> {
    let replaced = categories
        .iter()
        .map(|c| if c == from { to } else { c.as_str() });
    canonical_categories(replaced)
        .into_iter()
        .filter(|c| c != UNCATEGORIZED)
        .collect()
}

/// Category operations over a post repository
pub struct CategoryIndex<'a, S> {
    repo: &'a PostRepository<S>,
}

impl<'a, S: Storage> CategoryIndex<'a, S> {
    pub fn new(repo: &'a PostRepository<S>) -> Self {
        Self { repo }
    }

    /// Current category counts, recomputed from every post
    pub fn counts(&self, include_drafts: bool) -> Result<Vec<CategoryCount>> {
        let posts = self.repo.load_all()?;
        Ok(aggregate(
            posts
                .iter()
                .map(|p| &p.metadata)
                .filter(|meta| include_drafts || !meta.draft),
        ))
    }

    /// Rename a category in every post that has it
    ///
    /// A blank `to` removes the category, leaving posts with no other
    /// category uncategorized. Renaming to the same name does nothing.
    pub fn rename(&self, from: &str, to: &str) -> Result<BulkRewrite> {
        let from = from.trim();
        let to = to.trim();
        if from.is_empty() {
            return Err(BlogError::InvalidInput(
                "category name must not be empty".to_string(),
            ));
        }

        let mut outcome = BulkRewrite::default();
        if from == to {
            return Ok(outcome);
        }

        for post in self.repo.load_all()? {
            if !post.metadata.categories.iter().any(|c| c == from) {
                continue;
            }

            let result = self.repo.rewrite(&post, |meta| {
                meta.categories = replace_category(&meta.categories, from, to);
            });
            match result {
                Ok(_) => outcome.changed_count += 1,
                Err(e) => {
                    tracing::warn!("Failed to rewrite {:?}: {}", post.file, e);
                    outcome.failures.push(RewriteFailure {
                        slug: post.slug.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Category {:?} -> {:?}: {} post(s) rewritten, {} failed",
            from,
            to,
            outcome.changed_count,
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// Remove a category from every post
    pub fn delete(&self, name: &str) -> Result<BulkRewrite> {
        self.rename(name, "")
    }
}
