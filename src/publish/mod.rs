//! Publish - commit and push the site repository with `git`

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::{BlogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    /// False when the working tree was clean and nothing was pushed
    pub changed: bool,
}

/// Runs `git` in the site repository
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
}

impl GitPublisher {
    pub fn new<P: AsRef<Path>>(repo_dir: P) -> Self {
        Self {
            repo_dir: repo_dir.as_ref().to_path_buf(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Run one git command, returning stdout
    async fn git(&self, args: &[&str]) -> Result<String> {
        tracing::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| BlogError::Publish(format!("git {} failed: {}", args[0], e)))?;

        if !output.status.success() {
            return Err(BlogError::Publish(format!(
                "git {} failed: {}",
                args[0],
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether the working tree has anything to commit
    pub async fn has_changes(&self) -> Result<bool> {
        let status = self.git(&["status", "--porcelain"]).await?;
        Ok(!status.trim().is_empty())
    }

    pub async fn commit_and_push(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"]).await?;
        self.git(&["commit", "-m", message]).await?;
        self.git(&["push"]).await?;
        Ok(())
    }

    /// Commit and push everything, or do nothing when the tree is clean
    pub async fn publish(&self, message: Option<&str>) -> Result<PublishOutcome> {
        if !self.has_changes().await? {
            tracing::info!("Nothing to publish");
            return Ok(PublishOutcome { changed: false });
        }

        let message = match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => m.to_string(),
            None => default_message(Utc::now()),
        };
        self.commit_and_push(&message).await?;
        tracing::info!("Published: {}", message);
        Ok(PublishOutcome { changed: true })
    }
}

/// Commit message used when none is given
pub fn default_message(now: DateTime<Utc>) -> String {
    format!("Update posts {}", now.format("%Y-%m-%d %H:%M"))
}
