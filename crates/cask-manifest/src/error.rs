use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The source could not be turned into a manifest at all.
    #[error("malformed manifest: {reason}")]
    Malformed { reason: String },

    /// The manifest parsed but breaks an invariant.
    #[error("invalid manifest: {reason}")]
    Validation { reason: String },

    #[error("failed to read manifest {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

impl ManifestError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}
