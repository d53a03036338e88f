use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use cask_fetch::FetchError;
use cask_manifest::ManifestError;
use cask_resolve::ResolveError;
use cask_state::{InstallationRecord, StateError};
use cask_verify::Sha256Digest;

/// Coarse classification of an [`InstallError`], stable enough to script against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedManifest,
    ValidationError,
    UnresolvableVersion,
    FetchFailed,
    DownloadTimeout,
    IntegrityMismatch,
    MissingArtifactEntry,
    InconsistentState,
    NotInstalled,
    Corrupted,
    Conflict,
    Io,
}

impl ErrorKind {
    /// Process exit code for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::MalformedManifest => 10,
            ErrorKind::ValidationError => 11,
            ErrorKind::UnresolvableVersion => 12,
            ErrorKind::FetchFailed => 13,
            ErrorKind::DownloadTimeout => 14,
            ErrorKind::IntegrityMismatch => 15,
            ErrorKind::MissingArtifactEntry => 16,
            ErrorKind::InconsistentState => 17,
            ErrorKind::NotInstalled => 18,
            ErrorKind::Corrupted => 19,
            ErrorKind::Conflict => 20,
            ErrorKind::Io => 1,
        }
    }

    /// Whether repeating the operation unchanged is safe.
    pub fn is_retryable(self) -> bool { !matches!(self, ErrorKind::InconsistentState) }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedManifest => "malformed manifest",
            ErrorKind::ValidationError => "validation error",
            ErrorKind::UnresolvableVersion => "unresolvable version",
            ErrorKind::FetchFailed => "fetch failed",
            ErrorKind::DownloadTimeout => "download timeout",
            ErrorKind::IntegrityMismatch => "integrity mismatch",
            ErrorKind::MissingArtifactEntry => "missing artifact entry",
            ErrorKind::InconsistentState => "inconsistent state",
            ErrorKind::NotInstalled => "not installed",
            ErrorKind::Corrupted => "corrupted",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Io => "i/o error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to download {url}: {source}")]
    FetchFailed {
        url:    String,
        #[source]
        source: FetchError,
    },

    #[error("download of {url} timed out after {after:?}")]
    DownloadTimeout { url: String, after: Duration },

    #[error("integrity mismatch for {url}: expected sha256 {expected}, got {actual}")]
    IntegrityMismatch {
        url:      String,
        expected: Sha256Digest,
        actual:   Sha256Digest,
    },

    #[error("artifact {url} has no entry '{entry}'")]
    MissingArtifactEntry { url: String, entry: String },

    #[error("failed to unpack {url}: {source}")]
    Archive {
        url:    String,
        #[source]
        source: cask_archive::Error,
    },

    #[error("{} already exists and is not owned by '{package}'", .path.display())]
    Conflict { package: String, path: PathBuf },

    #[error(
        "'{package}' was left inconsistent; these paths need manual attention: {}",
        display_paths(.paths)
    )]
    InconsistentState {
        package:  String,
        paths:    Vec<PathBuf>,
        /// The record that should have described the installed files.
        expected: Box<InstallationRecord>,
    },

    #[error("'{package}' is not installed")]
    NotInstalled { package: String },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Fs(#[from] cask_fs::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl InstallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Manifest(ManifestError::Malformed { .. }) => ErrorKind::MalformedManifest,
            Self::Manifest(ManifestError::Validation { .. }) => ErrorKind::ValidationError,
            Self::Manifest(ManifestError::Read { .. }) => ErrorKind::Io,
            Self::Resolve(_) => ErrorKind::UnresolvableVersion,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::DownloadTimeout { .. } => ErrorKind::DownloadTimeout,
            Self::IntegrityMismatch { .. } => ErrorKind::IntegrityMismatch,
            Self::MissingArtifactEntry { .. } => ErrorKind::MissingArtifactEntry,
            Self::Archive { .. } => ErrorKind::Io,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InconsistentState { .. } => ErrorKind::InconsistentState,
            Self::NotInstalled { .. } => ErrorKind::NotInstalled,
            Self::State(StateError::Corrupt { .. } | StateError::UnsupportedSchema { .. }) => {
                ErrorKind::Corrupted
            }
            Self::State(StateError::InvalidName(_)) => ErrorKind::ValidationError,
            Self::State(_) | Self::Fs(_) | Self::Task(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn from_fetch(url: &str, err: FetchError) -> Self {
        match err {
            FetchError::Timeout { after, .. } => Self::DownloadTimeout {
                url: url.to_string(),
                after,
            },
            FetchError::ChecksumMismatch { expected, actual } => Self::IntegrityMismatch {
                url: url.to_string(),
                expected,
                actual,
            },
            source => Self::FetchFailed {
                url: url.to_string(),
                source,
            },
        }
    }

    pub(crate) fn from_archive(url: &str, err: cask_archive::Error) -> Self {
        match err {
            cask_archive::Error::MissingEntry { entry } => Self::MissingArtifactEntry {
                url: url.to_string(),
                entry,
            },
            source => Self::Archive {
                url: url.to_string(),
                source,
            },
        }
    }
}

impl From<tokio::task::JoinError> for InstallError {
    fn from(err: tokio::task::JoinError) -> Self { Self::Task(err.to_string()) }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, InstallError>;
