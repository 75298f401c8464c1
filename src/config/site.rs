//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Name of the configuration file looked up in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// Main site configuration
///
/// Loaded once at startup and passed by reference to every view builder;
/// nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub reward_image_path: String,
    #[serde(default)]
    pub nav: Vec<NavItem>,

    // URL
    /// Site origin, e.g. `https://user.github.io`
    pub url: String,
    /// Base path the site is served under, e.g. `/blog/`
    pub root: String,
    /// Top-level routes listed in the sitemap besides posts
    #[serde(default)]
    pub static_routes: Vec<String>,

    // Directory
    pub posts_dir: String,
    pub public_dir: String,
    pub admin_dir: String,

    // Admin server
    pub admin_port: u16,

    // Views
    pub search_text_limit: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Navigation entry shown by the site header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub href: String,
    pub label: String,
}

impl NavItem {
    fn new(href: &str, label: &str) -> Self {
        Self {
            href: href.to_string(),
            label: label.to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: "一个小小的个人博客".to_string(),
            author: String::new(),
            language: "zh-CN".to_string(),
            reward_image_path: "/reward.png".to_string(),
            nav: vec![
                NavItem::new("/", "首页"),
                NavItem::new("/posts", "文章"),
                NavItem::new("/categories", "分类"),
                NavItem::new("/search", "搜索"),
                NavItem::new("/about", "关于"),
            ],

            url: "http://localhost:4321".to_string(),
            root: "/".to_string(),
            static_routes: vec![
                "/".to_string(),
                "posts/".to_string(),
                "categories/".to_string(),
                "search/".to_string(),
                "about/".to_string(),
            ],

            posts_dir: "src/content/blog".to_string(),
            public_dir: "public".to_string(),
            admin_dir: "tools/admin/public".to_string(),

            admin_port: 4322,

            search_text_limit: 6000,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `_config.yml` from `base_dir` (defaults when absent) and apply
    /// environment overrides
    pub fn load_from_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let path = base_dir.as_ref().join(CONFIG_FILE);
        let mut config = if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            Self::load(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `SITE_URL`, `SITE_BASE` and `ADMIN_PORT` overrides
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SITE_URL").filter(|v| !v.trim().is_empty()) {
            self.url = url.trim().to_string();
        }
        if let Some(base) = lookup("SITE_BASE") {
            self.root = base.trim().to_string();
        }
        if let Some(port) = lookup("ADMIN_PORT") {
            match port.trim().parse() {
                Ok(port) => self.admin_port = port,
                Err(e) => tracing::warn!("Ignoring ADMIN_PORT={:?}: {}", port, e),
            }
        }
    }
}
