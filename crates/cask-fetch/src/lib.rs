//! HTTP downloading with streaming verification into scoped temp storage.
//!
//! # Architecture
//!
//! - [`data`] - options and progress types
//! - [`core`] - pure helpers (retry backoff, retry classification)
//! - `effects` - I/O behind the [`HttpClient`] trait
//!
//! # Key Features
//!
//! - **Single-Pass**: bytes are hashed while they stream to disk
//! - **Scoped**: a [`Download`] owns its temp directory; dropping it deletes the file
//! - **Bounded**: an optional timeout covers the whole transfer, retries included

pub mod core;
pub mod data;
mod effects;
mod error;

pub use self::core::retry_delay;
pub use data::{FetchOptions, FetchPhase, Progress};
pub use effects::{BoxStream, Download, Fetcher, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
