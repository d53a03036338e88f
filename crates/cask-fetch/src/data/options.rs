use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cask_verify::Sha256Digest;

use super::progress::Progress;

/// Configuration for one fetch.
///
/// ```
/// use cask_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .timeout(Duration::from_secs(60))
///     .max_retries(5)
///     .header("Accept", "application/octet-stream");
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Expected SHA-256 of the body. The fetch fails on mismatch.
    pub checksum: Option<Sha256Digest>,

    /// Upper bound for the whole transfer, retries included.
    ///
    /// Default: None
    pub timeout: Option<Duration>,

    /// Retries after the initial attempt, for transient failures only.
    ///
    /// Default: 3
    pub max_retries: u32,

    /// Base delay for exponential backoff; retry N waits `retry_backoff * 2^N`.
    ///
    /// Default: 100ms
    pub retry_backoff: Duration,

    /// Extra request headers, sent with every attempt.
    pub headers: Arc<[(String, String)]>,

    /// Invoked on phase transitions and after every chunk written.
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("checksum", &self.checksum)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("headers", &self.headers)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            checksum:      None,
            timeout:       None,
            max_retries:   3,
            retry_backoff: Duration::from_millis(100),
            headers:       Arc::from(Vec::new()),
            on_progress:   None,
        }
    }
}

impl FetchOptions {
    pub fn checksum(mut self, checksum: Option<Sha256Digest>) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = self.headers.to_vec();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(callback) = &self.on_progress {
            callback(&progress);
        }
    }
}
