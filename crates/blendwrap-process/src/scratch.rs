//! Per-invocation scratch directories.
//!
//! A scratch directory is never removed implicitly. The launcher calls
//! [`ScratchDir::cleanup`] after a successful run and
//! [`ScratchDir::preserve`] otherwise, so a failed run leaves its transfer
//! artifact on disk for inspection.

use std::path::{Path, PathBuf};

use crate::error::{ProcessError, ProcessResult};

/// Name prefix of every scratch directory.
pub const SCRATCH_PREFIX: &str = "bzlblend-";

/// A uniquely named directory owned by one invocation.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Creates a fresh directory under `root`, creating `root` if needed.
    pub fn create(root: &Path) -> ProcessResult<Self> {
        let create_err = |source| ProcessError::ScratchCreate {
            root: root.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(root).map_err(create_err)?;
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(root)
            .map_err(create_err)?;

        let path = dir.keep();
        tracing::debug!("Created scratch directory {}", path.display());
        Ok(Self { path })
    }

    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory and everything in it.
    pub fn cleanup(self) -> ProcessResult<()> {
        std::fs::remove_dir_all(&self.path).map_err(|source| ProcessError::ScratchCleanup {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("Removed scratch directory {}", self.path.display());
        Ok(())
    }

    /// Leaves the directory in place and returns its path.
    pub fn preserve(self) -> PathBuf {
        tracing::warn!(
            "Leaving scratch directory for inspection: {}",
            self.path.display()
        );
        self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchDir::create(root.path()).unwrap();
        let b = ScratchDir::create(root.path()).unwrap();

        assert_ne!(a.path(), b.path());
        for dir in [&a, &b] {
            assert!(dir.path().is_dir());
            let name = dir.path().file_name().unwrap().to_string_lossy();
            assert!(name.starts_with(SCRATCH_PREFIX));
        }
    }

    #[test]
    fn test_create_makes_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b");
        let dir = ScratchDir::create(&nested).unwrap();
        assert!(dir.path().starts_with(&nested));
    }

    #[test]
    fn test_cleanup_removes_contents() {
        let root = tempfile::tempdir().unwrap();
        let dir = ScratchDir::create(root.path()).unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("args.json"), "{}").unwrap();

        dir.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_preserve_and_drop_keep_directory() {
        let root = tempfile::tempdir().unwrap();

        let kept = ScratchDir::create(root.path()).unwrap().preserve();
        assert!(kept.is_dir());

        let dropped = {
            let dir = ScratchDir::create(root.path()).unwrap();
            dir.path().to_path_buf()
        };
        assert!(dropped.is_dir());
    }
}
