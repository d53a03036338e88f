use std::path::{Path, PathBuf};

use cask_verify::{Hasher, Sha256Digest, Sha256Hasher};
use futures_util::StreamExt;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

use crate::core::{is_success, retry_delay};
use crate::data::{FetchOptions, FetchPhase, Progress};
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};

const FALLBACK_FILE_NAME: &str = "download";

/// A fully downloaded, verified artifact.
///
/// The file lives in a private temp directory owned by this value; dropping
/// the `Download` deletes it.
#[derive(Debug)]
pub struct Download {
    dir:    TempDir,
    path:   PathBuf,
    size:   u64,
    digest: Sha256Digest,
}

impl Download {
    pub fn path(&self) -> &Path { &self.path }

    pub fn size(&self) -> u64 { self.size }

    /// SHA-256 of the bytes actually received.
    pub fn digest(&self) -> Sha256Digest { self.digest }

    /// Name the file was saved under.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(FALLBACK_FILE_NAME)
    }

    /// Delete the download now, reporting failures instead of ignoring them.
    pub fn close(self) -> std::io::Result<()> { self.dir.close() }
}

/// Downloads into fresh temp directories under `workspace_root`.
pub struct Fetcher<C: HttpClient> {
    client:         C,
    workspace_root: PathBuf,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            workspace_root: workspace_root.into(),
        }
    }

    pub fn client(&self) -> &C { &self.client }

    pub fn workspace_root(&self) -> &Path { &self.workspace_root }

    /// Fetch `url` into a temp file named `file_name`.
    ///
    /// Transient failures are retried with exponential backoff. The optional
    /// timeout bounds the whole call, retries and backoff included. On any
    /// error the partial file is removed.
    pub async fn fetch(&self, url: &str, file_name: &str, options: &FetchOptions) -> Result<Download> {
        std::fs::create_dir_all(&self.workspace_root).map_err(|e| FetchError::Io {
            path:   self.workspace_root.clone(),
            source: e,
        })?;
        let dir = tempfile::Builder::new()
            .prefix(".cask-fetch-")
            .tempdir_in(&self.workspace_root)
            .map_err(|e| FetchError::Io {
                path:   self.workspace_root.clone(),
                source: e,
            })?;
        let path = dir.path().join(sanitize_file_name(file_name));

        tracing::debug!(url, path = %path.display(), "fetching");

        let transfer = self.fetch_with_retries(url, &path, options);
        let (size, digest) = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, transfer)
                .await
                .map_err(|_| FetchError::Timeout {
                    url:   url.to_string(),
                    after: limit,
                })??,
            None => transfer.await?,
        };

        tracing::debug!(url, size, %digest, "fetched");
        Ok(Download {
            dir,
            path,
            size,
            digest,
        })
    }

    async fn fetch_with_retries(
        &self,
        url: &str,
        path: &Path,
        options: &FetchOptions,
    ) -> Result<(u64, Sha256Digest)> {
        let mut retry_count = 0;
        loop {
            match self.attempt(url, path, options, retry_count).await {
                Ok(done) => return Ok(done),
                Err(err) if err.is_transient() && retry_count < options.max_retries => {
                    let delay = retry_delay(retry_count, options.retry_backoff);
                    retry_count += 1;
                    tracing::warn!(url, retry = retry_count, ?delay, error = %err, "transient fetch failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        path: &Path,
        options: &FetchOptions,
        retry_count: u32,
    ) -> Result<(u64, Sha256Digest)> {
        let report = |phase, bytes_downloaded, total_bytes| {
            options.report(Progress {
                phase,
                bytes_downloaded,
                total_bytes,
                retry_count,
            })
        };
        let network = |e: C::Error| FetchError::Network {
            url:     url.to_string(),
            message: e.to_string(),
        };
        let io = |e: std::io::Error| FetchError::Io {
            path:   path.to_path_buf(),
            source: e,
        };

        report(FetchPhase::Connecting, 0, None);
        let response = self.client.get(url, &options.headers).await.map_err(network)?;
        if !is_success(response.status) {
            return Err(FetchError::Status {
                url:    url.to_string(),
                status: response.status,
            });
        }

        let total = response.content_length;
        let mut body = response.body;
        let mut file = tokio::fs::File::create(path).await.map_err(io)?;
        let mut hasher = Sha256Hasher::new();
        let mut downloaded = 0u64;

        report(FetchPhase::Downloading, 0, total);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(network)?;
            hasher.update(&chunk);
            file.write_all(&chunk).await.map_err(io)?;
            downloaded += chunk.len() as u64;
            report(FetchPhase::Downloading, downloaded, total);
        }
        file.flush().await.map_err(io)?;
        file.sync_all().await.map_err(io)?;
        drop(file);

        if let Some(expected) = total {
            if expected != downloaded {
                return Err(FetchError::Network {
                    url:     url.to_string(),
                    message: format!("body ended after {downloaded} of {expected} bytes"),
                });
            }
        }

        report(FetchPhase::Verifying, downloaded, total);
        let digest = hasher.finalize();
        if let Some(expected) = options.checksum {
            expected.verify(digest)?;
        }

        report(FetchPhase::Completed, downloaded, total);
        Ok((downloaded, digest))
    }
}

/// Reduce a caller-supplied name to a single safe path component.
fn sanitize_file_name(name: &str) -> &str {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("");
    match last {
        "" | "." | ".." => FALLBACK_FILE_NAME,
        other => other,
    }
}
