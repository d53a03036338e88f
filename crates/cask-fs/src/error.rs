use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from:   PathBuf,
        to:     PathBuf,
        source: io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("failed to lock {path}: {source}")]
    Lock { path: PathBuf, source: io::Error },

    #[error("lock is held by another process: {path}")]
    WouldBlock { path: PathBuf },

    #[error("path has no parent directory: {0}")]
    NoParent(PathBuf),

    #[error("cross-device hardlink not supported")]
    CrossDeviceHardlink,
}

impl Error {
    /// The path the failed operation was acting on.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Remove { path, .. }
            | Self::Lock { path, .. }
            | Self::WouldBlock { path }
            | Self::NoParent(path) => Some(path),
            Self::Rename { to, .. } => Some(to),
            Self::CrossDeviceHardlink => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
