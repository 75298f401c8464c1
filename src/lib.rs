//! blogsmith: content pipeline and local admin server for a Markdown blog
//!
//! Posts are Markdown files with YAML frontmatter in one directory. This
//! crate normalizes their metadata, derives the published views (RSS,
//! sitemap, search index, robots.txt, category listing), rewrites
//! categories across posts, and serves a JSON API for a local editor.

pub mod assets;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod publish;
pub mod server;
pub mod storage;
pub mod taxonomy;
pub mod views;

pub use error::{BlogError, Result};

use std::path::{Path, PathBuf};

use assets::RewardImage;
use content::PostRepository;
use publish::GitPublisher;
use storage::FsStorage;

/// A blog checkout: its configuration and resolved directories
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory (the site repository)
    pub base_dir: PathBuf,
    /// Post files
    pub posts_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static files of the admin UI
    pub admin_dir: PathBuf,
}

impl Blog {
    /// Open the blog in `base_dir`, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config = config::SiteConfig::load_from_dir(base_dir.as_ref())?;
        Ok(Self::with_config(base_dir, config))
    }

    /// Open the blog with an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let admin_dir = base_dir.join(&config.admin_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
            admin_dir,
        }
    }

    pub fn repository(&self) -> PostRepository<FsStorage> {
        PostRepository::new(FsStorage::new(&self.posts_dir))
    }

    pub fn public_storage(&self) -> FsStorage {
        FsStorage::new(&self.public_dir)
    }

    pub fn reward_image(&self) -> RewardImage<FsStorage> {
        RewardImage::new(self.public_storage())
    }

    pub fn publisher(&self) -> GitPublisher {
        GitPublisher::new(&self.base_dir)
    }
}
