//! File storage - a flat directory of files keyed by file name

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Flat key-value file store
///
/// Keys are bare file names; anything that could escape the store (path
/// separators, `.` or `..`) is rejected with `InvalidInput`.
pub trait Storage {
    /// File names in the store, sorted
    fn list(&self) -> io::Result<Vec<String>>;

    /// Read a file's bytes
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Replace a file's bytes; readers never observe a partial write
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Remove a file
    fn remove(&self, name: &str) -> io::Result<()>;

    /// Whether a file with this name exists
    fn exists(&self, name: &str) -> bool;
}

/// [`Storage`] backed by one directory on disk
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create a store rooted at `root` (the directory is created lazily)
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        if !is_valid_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name: {:?}", name),
            ));
        }
        Ok(self.root.join(name))
    }
}

impl Storage for FsStorage {
    fn list(&self) -> io::Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => tracing::warn!("Skipping non UTF-8 file name {:?}", entry.path()),
            }
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_for(name)?)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.path_for(name)?;
        fs::create_dir_all(&self.root)?;

        // Write next to the target, then rename over it
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        if let Some(permissions) = permissions_for(&target) {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.persist(&target).map_err(|e| e.error)?;

        tracing::debug!("Wrote {:?} ({} bytes)", target, bytes.len());
        Ok(())
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        let path = self.path_for(name)?;
        fs::remove_file(&path)?;
        tracing::debug!("Removed {:?}", path);
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// Permissions for a replaced file: the target's own, or 0644 when new
///
/// Temp files start owner-only.
#[cfg(unix)]
fn permissions_for(target: &Path) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(match fs::metadata(target) {
        Ok(meta) => meta.permissions(),
        Err(_) => fs::Permissions::from_mode(0o644),
    })
}

#[cfg(not(unix))]
fn permissions_for(target: &Path) -> Option<fs::Permissions> {
    fs::metadata(target).ok().map(|meta| meta.permissions())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
