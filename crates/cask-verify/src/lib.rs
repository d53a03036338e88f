//! Content verification primitives for downloaded artifacts.
//!
//! Provides incremental hashing and verification without enforcing a
//! verification policy. Bytes are hashed as they move, so a download or a
//! copy touches its data only once.
//!
//! # Example
//!
//! ```
//! use cask_verify::{Hasher, Sha256Digest, Sha256Hasher};
//!
//! let expected = Sha256Digest::of(b"hello world");
//!
//! let mut hasher = Sha256Hasher::new();
//! for chunk in [&b"hello "[..], &b"world"[..]] {
//!     hasher.update(chunk);
//! }
//! expected.verify(hasher.finalize()).unwrap();
//! ```

pub use self::digest::{ParseDigestError, Sha256Digest};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{Hasher, Sha256Hasher, hash_file, hash_reader};

mod digest;
mod error;
mod hasher;
