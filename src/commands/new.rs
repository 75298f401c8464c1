//! Create a new post

use anyhow::Result;

use crate::content::{clean_slug, FrontmatterOverrides, Post};
use crate::Blog;

/// Create a post titled `title` in the posts directory
///
/// The slug defaults to the title with forbidden file name characters
/// replaced. Fails if a post with that slug already exists.
pub fn create_post(
    blog: &Blog,
    title: &str,
    slug: Option<&str>,
    categories: &[String],
) -> Result<Post> {
    let slug = clean_slug(slug.unwrap_or(title));
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}", title);
    }

    let repo = blog.repository();
    if repo.get(&slug)?.is_some() {
        anyhow::bail!("Post already exists: {}", slug);
    }

    let overrides = FrontmatterOverrides {
        title: Some(title.to_string()),
        description: None,
        categories: Some(categories.join(",")),
    };
    let post = repo.upsert(&slug, "", &overrides)?;

    println!("Created: {:?}", blog.posts_dir.join(&post.file));
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());

        let post = create_post(&blog, "Hello: World", None, &["Tech".to_string()]).unwrap();
        assert_eq!(post.slug, "Hello_ World");
        assert_eq!(post.metadata.title, "Hello: World");
        assert_eq!(post.metadata.categories, vec!["Tech"]);
        assert!(blog.posts_dir.join("Hello_ World.md").exists());
    }

    #[test]
    fn test_title_with_dot_keeps_full_slug() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        let post = create_post(&blog, "v1.2 released", None, &[]).unwrap();
        assert_eq!(post.file, "v1.2 released.md");
    }

    #[test]
    fn test_existing_post_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());

        create_post(&blog, "First", Some("post"), &[]).unwrap();
        assert!(create_post(&blog, "Second", Some("post"), &[]).is_err());
        let post = blog.repository().get("post").unwrap().unwrap();
        assert_eq!(post.metadata.title, "First");
    }
}
