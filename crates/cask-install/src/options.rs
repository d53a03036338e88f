use std::time::Duration;

use cask_fetch::{FetchOptions, Progress};

/// Knobs for an [`crate::Installer`].
#[derive(Debug, Clone, Default)]
pub struct InstallerOptions {
    /// Overwrite target files not owned by the package being installed.
    pub force: bool,
    /// Transfer settings; the checksum is filled in per artifact.
    pub fetch: FetchOptions,
}

impl InstallerOptions {
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Bound each download, retries included.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.fetch.max_retries = max_retries;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.fetch.retry_backoff = backoff;
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.fetch = self.fetch.on_progress(callback);
        self
    }
}
