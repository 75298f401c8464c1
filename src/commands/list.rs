//! List site content

use anyhow::Result;

use crate::taxonomy::CategoryIndex;
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let repo = blog.repository();

    match content_type {
        "post" | "posts" => {
            let posts = repo.list()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let draft = if post.draft { " (draft)" } else { "" };
                println!(
                    "  {} - {}{} [{}]",
                    post.pub_date.format("%Y-%m-%d"),
                    post.title,
                    draft,
                    post.file
                );
            }
        }
        "category" | "categories" => {
            let categories = CategoryIndex::new(&repo).counts(true)?;
            println!("Categories ({}):", categories.len());
            for category in categories {
                println!("  {} ({})", category.name, category.count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, categories",
                content_type
            );
        }
    }

    Ok(())
}
