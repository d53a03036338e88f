use std::fmt;

/// Phases of a download.
///
/// Connecting → Downloading → Verifying → Completed. A retry returns to
/// Connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Connecting,
    Downloading,
    Verifying,
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Verifying => write!(f, "Verifying"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub phase:            FetchPhase,
    pub bytes_downloaded: u64,
    /// From `Content-Length`, when the server sent one.
    pub total_bytes:      Option<u64>,
    pub retry_count:      u32,
}

impl Progress {
    /// Completion ratio in `0.0..=1.0`, when the total size is known.
    pub fn percentage(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_downloaded as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}
