//! Post repository - reads and writes post files through a [`Storage`]

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

use super::decode::decode_text;
use super::frontmatter::{date_value, normalize, parse_document, render_document, UNTITLED};
use super::{FrontmatterOverrides, Post, PostMetadata, PostSummary};
use crate::error::{BlogError, Result};
use crate::storage::Storage;

/// Recognized post file extensions, in lookup order
pub const POST_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Characters that may not appear in a slug
const FORBIDDEN_SLUG_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Source of "now" for default and updated timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Derive a slug from an uploaded file name
///
/// The extension is stripped and each of `\ / : * ? " < > |` becomes `_`;
/// nothing else is touched.
pub fn sanitize_slug(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    clean_slug(stem)
}

/// Trim and replace forbidden characters, keeping any dots
pub fn clean_slug(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if FORBIDDEN_SLUG_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Lists, reads and rewrites posts; every read is normalized
pub struct PostRepository<S> {
    storage: S,
    clock: Arc<dyn Clock>,
}

impl<S: Storage> PostRepository<S> {
    /// Create a repository using the wall clock
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    /// Create a repository with a custom clock
    pub fn with_clock(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current time according to the repository clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load every post, newest first
    ///
    /// Files that cannot be read are skipped with a warning. Posts with equal
    /// `pubDate` keep file name order.
    pub fn load_all(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();

        for file in self.storage.list()? {
            if !is_post_file(&file) {
                continue;
            }
            match self.read_post(&file) {
                Ok(post) => posts.push(post),
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", file, e);
                }
            }
        }

        // Sort by date descending (newest first); sort_by is stable
        posts.sort_by(|a, b| b.metadata.pub_date.cmp(&a.metadata.pub_date));

        Ok(posts)
    }

    /// Summaries of every post, newest first
    pub fn list(&self) -> Result<Vec<PostSummary>> {
        Ok(self.load_all()?.iter().map(Post::summary).collect())
    }

    /// Look up a post by slug
    pub fn get(&self, slug: &str) -> Result<Option<Post>> {
        match self.find_file(slug) {
            Some(file) => self.read_post(&file).map(Some),
            None => Ok(None),
        }
    }

    /// Create or overwrite the post `slug` from uploaded Markdown
    ///
    /// An existing post keeps its `pubDate` unless the new content sets a
    /// readable one, and gets `updatedDate` stamped. Overrides win over parsed values.
    pub fn upsert(
        &self,
        slug: &str,
        content: &str,
        overrides: &FrontmatterOverrides,
    ) -> Result<Post> {
        let slug = slug.trim();
        if slug.is_empty() || slug.contains(FORBIDDEN_SLUG_CHARS) {
            return Err(BlogError::InvalidInput(format!("invalid slug: {:?}", slug)));
        }

        let now = self.clock.now();
        let (raw, body) = parse_document(content);
        let mut meta = normalize(&raw, now);
        if meta.title == UNTITLED {
            meta.title = slug.to_string();
        }

        let existing = self.find_file(slug);
        if let Some(file) = &existing {
            let previous = self.read_post(file)?;
            if raw.get("pubDate").and_then(date_value).is_none() {
                meta.pub_date = previous.metadata.pub_date;
            }
            meta.updated_date = Some(now);
        }

        overrides.apply(&mut meta);

        let target = format!("{}.md", slug);
        let text = render_document(&meta, body)?;
        self.storage.write(&target, text.as_bytes())?;

        if let Some(old) = existing.filter(|f| *f != target) {
            self.storage.remove(&old)?;
            tracing::debug!("Replaced {:?} with {:?}", old, target);
        }

        tracing::info!("Saved post {:?} ({})", slug, target);

        Ok(Post {
            slug: slug.to_string(),
            file: target,
            metadata: meta,
            body: body.to_string(),
            raw: text,
        })
    }

    /// Delete the post `slug`; `false` when it does not exist
    pub fn delete(&self, slug: &str) -> Result<bool> {
        match self.find_file(slug) {
            Some(file) => {
                self.storage.remove(&file)?;
                tracing::info!("Deleted post {:?}", file);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rewrite a post's frontmatter, keeping its body byte-for-byte
    ///
    /// `updatedDate` is stamped after `edit` runs.
    pub fn rewrite<F>(&self, post: &Post, edit: F) -> Result<Post>
    where
        F: FnOnce(&mut PostMetadata),
    {
        let mut meta = post.metadata.clone();
        edit(&mut meta);
        meta.updated_date = Some(self.clock.now());

        let text = render_document(&meta, &post.body)?;
        self.storage.write(&post.file, text.as_bytes())?;

        Ok(Post {
            slug: post.slug.clone(),
            file: post.file.clone(),
            metadata: meta,
            body: post.body.clone(),
            raw: text,
        })
    }

    fn find_file(&self, slug: &str) -> Option<String> {
        POST_EXTENSIONS
            .iter()
            .map(|ext| format!("{}.{}", slug, ext))
            .find(|file| self.storage.exists(file))
    }

    /// Load a single post from a file
    fn read_post(&self, file: &str) -> Result<Post> {
        let bytes = self.storage.read(file)?;
        let raw = decode_text(&bytes);
        let (fm, body) = parse_document(&raw);
        let metadata = normalize(&fm, self.clock.now());
        let body = body.to_string();

        let slug = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file)
            .to_string();

        Ok(Post {
            slug,
            file: file.to_string(),
            metadata,
            body,
            raw,
        })
    }
}

/// Check if a file name has a post extension
fn is_post_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| POST_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
