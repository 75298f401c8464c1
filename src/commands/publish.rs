//! Commit and push the site

use anyhow::Result;

use crate::Blog;

pub async fn run(blog: &Blog, message: Option<&str>) -> Result<()> {
    let outcome = blog.publisher().publish(message).await?;
    if outcome.changed {
        println!("Published successfully!");
    } else {
        println!("Nothing to publish.");
    }
    Ok(())
}
