//! Reward image - the single donation QR code served from the public dir

use std::path::Path;

use crate::error::Result;
use crate::storage::Storage;

const REWARD_STEM: &str = "reward";
const DEFAULT_EXTENSION: &str = "png";

/// Stores `reward.<ext>` in the public directory
pub struct RewardImage<S> {
    storage: S,
}

impl<S: Storage> RewardImage<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Site path of the current image, if any
    pub fn find(&self) -> Result<Option<String>> {
        let found = self
            .storage
            .list()?
            .into_iter()
            .find(|name| is_reward_file(name));
        Ok(found.map(|name| format!("/{}", name)))
    }

    /// Replace the image, keeping the uploaded file's extension
    ///
    /// Any previous `reward.*` with a different extension is removed.
    pub fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let target = format!("{}.{}", REWARD_STEM, extension_of(original_name));
        self.storage.write(&target, bytes)?;

        for name in self.storage.list()? {
            if name != target && is_reward_file(&name) {
                self.storage.remove(&name)?;
                tracing::debug!("Removed stale reward image {:?}", name);
            }
        }

        tracing::info!("Saved reward image {:?} ({} bytes)", target, bytes.len());
        Ok(format!("/{}", target))
    }
}

fn is_reward_file(name: &str) -> bool {
    name.split_once('.')
        .is_some_and(|(stem, ext)| stem.eq_ignore_ascii_case(REWARD_STEM) && !ext.is_empty())
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
