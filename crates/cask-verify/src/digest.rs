use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::VerificationError;

/// A SHA-256 digest, rendered as 64 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDigestError {
    #[error("expected 64 hex digits, got {0}")]
    Length(usize),

    #[error("invalid hex digit in digest")]
    InvalidHex,
}

impl Sha256Digest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self { Self(bytes) }

    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self { Self(Sha256::digest(data).into()) }

    pub fn to_hex(&self) -> String { hex::encode(self.0) }

    /// Compare `actual` against this expected digest.
    pub fn verify(&self, actual: Sha256Digest) -> crate::Result<()> {
        if *self == actual {
            Ok(())
        } else {
            Err(VerificationError::Mismatch {
                expected: *self,
                actual,
            })
        }
    }
}

impl FromStr for Sha256Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(ParseDigestError::Length(s.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseDigestError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_hex()) }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_digest_of_matches_known_value() {
        assert_eq!(Sha256Digest::of(b"hello world").to_hex(), HELLO_WORLD);
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let digest: Sha256Digest = HELLO_WORLD.to_uppercase().parse().unwrap();
        assert_eq!(digest.to_string(), HELLO_WORLD);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!("abcd".parse::<Sha256Digest>(), Err(ParseDigestError::Length(4)));
    }

    #[test]
    fn test_verify_reports_both_digests() {
        let expected = Sha256Digest::of(b"a");
        assert!(expected.verify(Sha256Digest::of(b"a")).is_ok());
        match expected.verify(Sha256Digest::of(b"b")) {
            Err(VerificationError::Mismatch { expected: e, actual }) => {
                assert_eq!(e, expected);
                assert_eq!(actual, Sha256Digest::of(b"b"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let bad = "z".repeat(64);
        assert_eq!(bad.parse::<Sha256Digest>(), Err(ParseDigestError::InvalidHex));
    }
}
