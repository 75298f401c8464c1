//! Content module - post files, frontmatter and Markdown

pub mod decode;
pub mod frontmatter;
mod markdown;
mod post;
pub mod repository;

pub use frontmatter::{canonical_categories, normalize, LooseList, UNTITLED};
pub use markdown::MarkdownRenderer;
pub use post::{FrontmatterOverrides, Post, PostMetadata, PostSummary};
pub use repository::{clean_slug, sanitize_slug, Clock, FixedClock, PostRepository, SystemClock};
