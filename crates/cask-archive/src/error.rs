use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported artifact format: {0}")]
    UnsupportedFormat(&'static str),

    #[error("artifact does not contain '{entry}'")]
    MissingEntry { entry: String },

    #[error("artifact entry '{entry}' is not a regular file")]
    NotAFile { entry: String },

    #[error("archive is corrupted: {0}")]
    Corrupted(String),

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
