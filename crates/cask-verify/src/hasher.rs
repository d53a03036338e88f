use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::Digest;

use crate::Sha256Digest;

const CHUNK_SIZE: usize = 64 * 1024;

/// Incremental hasher fed while data streams through.
pub trait Hasher: Send {
    type Output;

    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Self::Output;
}

#[derive(Clone, Default)]
pub struct Sha256Hasher(sha2::Sha256);

impl Sha256Hasher {
    pub fn new() -> Self { Self(sha2::Sha256::new()) }
}

impl Hasher for Sha256Hasher {
    type Output = Sha256Digest;

    fn update(&mut self, data: &[u8]) { self.0.update(data); }

    fn finalize(self) -> Sha256Digest { Sha256Digest::from_bytes(self.0.finalize().into()) }
}

/// Hash everything a reader yields, in fixed-size chunks.
pub fn hash_reader(mut reader: impl Read) -> io::Result<Sha256Digest> {
    let mut hasher = Sha256Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

pub fn hash_file(path: impl AsRef<Path>) -> io::Result<Sha256Digest> {
    hash_reader(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sha256_hasher_incremental() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), Sha256Digest::of(b"hello world"));
    }

    #[test]
    fn test_hash_reader_spans_chunks() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 17];
        let digest = hash_reader(Cursor::new(&data)).unwrap();
        assert_eq!(digest, Sha256Digest::of(&data));
    }
}
