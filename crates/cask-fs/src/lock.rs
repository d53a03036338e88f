use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// An exclusive advisory lock on a file, released when dropped.
///
/// The lock file itself is left in place; only the lock is released.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    fn open(path: &Path) -> Result<File> {
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::Lock {
                path:   path.to_path_buf(),
                source: e,
            })
    }

    /// Block until the lock is acquired.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = Self::open(path)?;
        file.lock_exclusive().map_err(|e| Error::Lock {
            path:   path.to_path_buf(),
            source: e,
        })?;
        tracing::trace!(path = %path.display(), "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Acquire the lock or fail with [`Error::WouldBlock`] if it is held.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = Self::open(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(Error::WouldBlock {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(Error::Lock {
                path:   path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
