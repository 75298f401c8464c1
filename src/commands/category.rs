//! Rename or delete a category across all posts

use anyhow::Result;

use crate::taxonomy::{BulkRewrite, CategoryIndex};
use crate::Blog;

pub fn rename(blog: &Blog, from: &str, to: &str) -> Result<BulkRewrite> {
    let repo = blog.repository();
    let outcome = CategoryIndex::new(&repo).rename(from, to)?;
    report(&outcome);
    Ok(outcome)
}

pub fn delete(blog: &Blog, name: &str) -> Result<BulkRewrite> {
    let repo = blog.repository();
    let outcome = CategoryIndex::new(&repo).delete(name)?;
    report(&outcome);
    Ok(outcome)
}

fn report(outcome: &BulkRewrite) {
    println!("Rewrote {} post(s)", outcome.changed_count);
    for failure in &outcome.failures {
        eprintln!("  failed: {} ({})", failure.slug, failure.reason);
    }
}
