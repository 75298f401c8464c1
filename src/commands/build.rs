//! Build the published views into the public directory

use anyhow::Result;
use chrono::Utc;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::CONFIG_FILE;
use crate::content::repository::POST_EXTENSIONS;
use crate::storage::Storage;
use crate::views;
use crate::Blog;

/// Write every view; returns the number of files written
pub fn run(blog: &Blog) -> Result<usize> {
    let start = Instant::now();

    let posts = blog.repository().load_all()?;
    tracing::info!("Loaded {} posts", posts.len());

    let rendered = views::render_all(&blog.config, &posts, Utc::now())?;
    let public = blog.public_storage();
    for view in &rendered {
        public.write(view.file_name, view.body.as_bytes())?;
        tracing::debug!("Generated {}", view.file_name);
    }

    tracing::info!(
        "Generated {} files in {:.2}s",
        rendered.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(rendered.len())
}

/// Rebuild whenever a post or the config changes
///
/// Runs until the watcher channel closes. The config is re-read before each
/// rebuild.
pub fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    std::fs::create_dir_all(&blog.posts_dir)?;
    debouncer
        .watcher()
        .watch(&blog.posts_dir, RecursiveMode::NonRecursive)?;
    tracing::debug!("Watching: {:?}", blog.posts_dir);

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    println!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events.iter().filter(|e| is_relevant(&e.path)).collect();
                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                let result = Blog::new(&blog.base_dir)
                    .map_err(anyhow::Error::from)
                    .and_then(|fresh| run(&fresh));
                match result {
                    Ok(count) => println!("Rebuilt {} files", count),
                    Err(e) => tracing::error!("Build failed: {}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Post files and the config; editor swap files and temp files are ignored
fn is_relevant(path: &Path) -> bool {
    if path.file_name().is_some_and(|name| name == CONFIG_FILE) {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| POST_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
