use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Fs(#[from] cask_fs::Error),

    #[error("record '{path}' is unreadable: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to encode record for '{package}': {reason}")]
    Encode { package: String, reason: String },

    #[error("record '{path}' uses schema {found}, newer than supported {supported}")]
    UnsupportedSchema {
        path:      PathBuf,
        found:     u32,
        supported: u32,
    },

    #[error("'{0}' is not a valid package name")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, StateError>;
