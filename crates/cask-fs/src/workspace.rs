use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A private staging directory, removed with everything left inside it on drop.
///
/// Create it next to the final destination so that moving staged files out
/// of it is a same-filesystem rename.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new_in(parent: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let parent = parent.as_ref();
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path:   parent.to_path_buf(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .map_err(|e| Error::Write {
                path:   parent.to_path_buf(),
                source: e,
            })?;

        tracing::trace!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path { self.dir.path() }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf { self.dir.path().join(name) }

    /// Remove the workspace now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| Error::Remove { path, source: e })
    }
}
