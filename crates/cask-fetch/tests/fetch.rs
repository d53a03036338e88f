use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use cask_fetch::{FetchError, FetchOptions, FetchPhase, Fetcher, HttpClient, HttpResponse};
use cask_verify::Sha256Digest;
use futures_util::{StreamExt, stream};

enum Reply {
    Body(u16, Vec<u8>),
    Hang,
    Refused,
}

/// Serves canned replies in order; the last one repeats.
struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls:   AtomicUsize,
}

impl ScriptedClient {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls:   AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    fn next_reply(&self) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            return replies.pop_front().unwrap();
        }
        match replies.front().unwrap() {
            Reply::Body(status, body) => Reply::Body(*status, body.clone()),
            Reply::Hang => Reply::Hang,
            Reply::Refused => Reply::Refused,
        }
    }
}

impl HttpClient for ScriptedClient {
    type Error = io::Error;

    async fn get(
        &self,
        _url: &str,
        _headers: &[(String, String)],
    ) -> Result<HttpResponse<io::Error>, io::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_reply() {
            Reply::Body(status, body) => {
                let len = body.len() as u64;
                let chunks: Vec<Result<Bytes, io::Error>> =
                    body.chunks(4).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
                Ok(HttpResponse::new(status, Some(len), stream::iter(chunks).boxed()))
            }
            Reply::Hang => Ok(HttpResponse::new(200, None, stream::pending().boxed())),
            Reply::Refused => Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
        }
    }
}

fn fast_options() -> FetchOptions { FetchOptions::default().retry_backoff(Duration::from_millis(1)) }

fn leftover_entries(root: &std::path::Path) -> usize {
    std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_fetch_verifies_and_saves() {
    let root = tempfile::tempdir().unwrap();
    let body = b"#!/bin/sh\necho unitrack\n".to_vec();
    let client = Arc::new(ScriptedClient::new(vec![Reply::Body(200, body.clone())]));
    let fetcher = Fetcher::new(client.clone(), root.path());

    let phases = Arc::new(Mutex::new(Vec::new()));
    let seen = phases.clone();
    let options = fast_options()
        .checksum(Some(Sha256Digest::of(&body)))
        .on_progress(move |p| seen.lock().unwrap().push(p.phase));

    let download = fetcher
        .fetch("https://example.com/unitrack", "unitrack", &options)
        .await
        .unwrap();

    assert_eq!(std::fs::read(download.path()).unwrap(), body);
    assert_eq!(download.size(), body.len() as u64);
    assert_eq!(download.digest(), Sha256Digest::of(&body));
    assert_eq!(download.file_name(), "unitrack");

    let phases = phases.lock().unwrap();
    assert_eq!(phases.first(), Some(&FetchPhase::Connecting));
    assert_eq!(phases.last(), Some(&FetchPhase::Completed));
    assert!(phases.contains(&FetchPhase::Verifying));

    let path = download.path().to_path_buf();
    drop(download);
    assert!(!path.exists());
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_checksum_mismatch_leaves_nothing_behind() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient::new(vec![Reply::Body(200, b"tampered".to_vec())]));
    let fetcher = Fetcher::new(client.clone(), root.path());
    let options = fast_options().checksum(Some(Sha256Digest::of(b"genuine")));

    let err = fetcher
        .fetch("https://example.com/tool", "tool", &options)
        .await
        .unwrap_err();

    match err {
        FetchError::ChecksumMismatch { expected, actual } => {
            assert_eq!(expected, Sha256Digest::of(b"genuine"));
            assert_eq!(actual, Sha256Digest::of(b"tampered"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.calls(), 1);
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient::new(vec![Reply::Body(404, Vec::new())]));
    let fetcher = Fetcher::new(client.clone(), root.path());

    let err = fetcher
        .fetch("https://example.com/missing", "missing", &fast_options())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_server_error_then_success_is_retried() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient::new(vec![
        Reply::Body(503, Vec::new()),
        Reply::Refused,
        Reply::Body(200, b"payload".to_vec()),
    ]));
    let fetcher = Fetcher::new(client.clone(), root.path());

    let download = fetcher
        .fetch("https://example.com/tool", "tool", &fast_options())
        .await
        .unwrap();

    assert_eq!(std::fs::read(download.path()).unwrap(), b"payload");
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient::new(vec![Reply::Body(500, Vec::new())]));
    let fetcher = Fetcher::new(client.clone(), root.path());

    let err = fetcher
        .fetch("https://example.com/tool", "tool", &fast_options().max_retries(2))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_timeout_covers_stalled_body() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient::new(vec![Reply::Hang]));
    let fetcher = Fetcher::new(client, root.path());
    let options = fast_options().timeout(Duration::from_millis(50));

    let err = fetcher
        .fetch("https://example.com/slow", "slow", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { after, .. } if after == Duration::from_millis(50)));
    assert_eq!(leftover_entries(root.path()), 0);
}
