//! Filesystem access
//!
//! Submission code goes through [`Filesystem`] so tests can observe and
//! fail individual operations.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Filesystem operations used while publishing
pub trait Filesystem: Send + Sync {
    /// Whether a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy a file, returning the number of bytes copied
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// The local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|source| Error::Filesystem {
            op: "create directory",
            path: path.to_path_buf(),
            source,
        })
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        std::fs::copy(from, to).map_err(|source| Error::Filesystem {
            op: "copy",
            path: from.to_path_buf(),
            source,
        })
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|source| Error::Filesystem {
            op: "remove",
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Make sure the directory that will hold `path` exists
pub fn ensure_parent_dir(fs: &dyn Filesystem, path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !fs.exists(dir) => {
            debug!("Creating publish directory {}", dir.display());
            fs.create_dir_all(dir)
        }
        _ => Ok(()),
    }
}

/// Remove a file, logging instead of failing
pub fn safe_delete_file(fs: &dyn Filesystem, path: &Path) {
    if !fs.exists(path) {
        debug!("Nothing to delete at {}", path.display());
        return;
    }
    match fs.remove_file(path) {
        Ok(()) => debug!("Deleted {}", path.display()),
        Err(e) => warn!("Could not delete {}: {e}", path.display()),
    }
}

/// Removes a file when dropped
///
/// Holding one of these across an await point ties the file's lifetime to
/// the scope: it is removed once, however the scope is left.
pub struct RemoveOnDrop {
    fs: Arc<dyn Filesystem>,
    path: PathBuf,
}

impl RemoveOnDrop {
    /// Schedule `path` for removal
    pub fn new(fs: Arc<dyn Filesystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    /// Path that will be removed
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        safe_delete_file(self.fs.as_ref(), &self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_parent_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a/b/c/file.mov");

        ensure_parent_dir(&LocalFilesystem, &target).unwrap();
        ensure_parent_dir(&LocalFilesystem, &target).unwrap();

        assert!(tmp.path().join("a/b/c").is_dir());
    }

    #[test]
    fn test_copy_missing_source_reports_path() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFilesystem
            .copy(&tmp.path().join("nope.mov"), &tmp.path().join("out.mov"))
            .unwrap_err();
        assert!(err.to_string().contains("nope.mov"));
    }

    #[test]
    fn test_remove_on_drop() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("upload.mov");
        std::fs::write(&file, b"data").unwrap();

        {
            let guard = RemoveOnDrop::new(Arc::new(LocalFilesystem), file.clone());
            assert_eq!(guard.path(), file);
            assert!(file.exists());
        }

        assert!(!file.exists());
    }

    #[test]
    fn test_safe_delete_missing_file_is_quiet() {
        let tmp = TempDir::new().unwrap();
        safe_delete_file(&LocalFilesystem, &tmp.path().join("gone.mov"));
    }
}
