use std::io;
use std::path::PathBuf;
use std::time::Duration;

use cask_verify::{Sha256Digest, VerificationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("download of {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        expected: Sha256Digest,
        actual:   Sha256Digest,
    },

    #[error("file I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether another attempt may succeed: connection-level failures and
    /// server errors. Client errors, timeouts and checksum mismatches are final.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<VerificationError> for FetchError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Mismatch { expected, actual } => Self::ChecksumMismatch { expected, actual },
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
