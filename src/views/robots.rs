//! robots.txt

use chrono::{DateTime, Utc};

use super::RenderedView;
use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;
use crate::helpers::full_url_for;

pub fn render(config: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        full_url_for(config, "sitemap.xml")
    )
}

pub fn view(config: &SiteConfig, _posts: &[Post], _generated_at: DateTime<Utc>) -> Result<RenderedView> {
    Ok(RenderedView {
        file_name: "robots.txt",
        content_type: "text/plain; charset=utf-8",
        body: render(config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_with_base() {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(
            render(&config),
            "User-agent: *\nAllow: /\n\nSitemap: https://example.com/blog/sitemap.xml\n"
        );
    }

    #[test]
    fn test_robots_default() {
        assert!(render(&SiteConfig::default())
            .ends_with("Sitemap: http://localhost:4321/sitemap.xml\n"));
    }
}
