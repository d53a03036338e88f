use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

const HEADER_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// The artifact is the binary itself.
    Raw,
    Tar,
    TarGz,
    /// A single gzip-compressed file that is not a tarball.
    Gzip,
    Zip,
}

impl ArtifactFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFormat::Raw => "raw",
            ArtifactFormat::Tar => "tar",
            ArtifactFormat::TarGz => "tar.gz",
            ArtifactFormat::Gzip => "gzip",
            ArtifactFormat::Zip => "zip",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Classify an artifact from its leading bytes and its file name.
///
/// Magic bytes win; the name only separates a gzipped tarball from a
/// single gzipped file. Compressed tarballs we cannot decode are rejected
/// rather than installed as if they were raw binaries.
pub fn detect(header: &[u8], file_name: &str) -> Result<ArtifactFormat> {
    match header {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Ok(ArtifactFormat::Zip),
        [0x1F, 0x8B, ..] => {
            let lower = file_name.to_ascii_lowercase();
            if lower.ends_with(".gz") && !lower.ends_with(".tar.gz") {
                Ok(ArtifactFormat::Gzip)
            } else {
                Ok(ArtifactFormat::TarGz)
            }
        }
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Err(Error::UnsupportedFormat("zstd")),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Err(Error::UnsupportedFormat("xz")),
        [0x42, 0x5A, 0x68, ..] => Err(Error::UnsupportedFormat("bzip2")),
        _ if is_tar_header(header) => Ok(ArtifactFormat::Tar),
        _ => Ok(ArtifactFormat::Raw),
    }
}

pub fn detect_file(path: &Path, file_name: &str) -> Result<ArtifactFormat> {
    let read_err = |e| Error::Read {
        path:   path.to_path_buf(),
        source: e,
    };
    let file = File::open(path).map_err(read_err)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(read_err)?;
    detect(&header, file_name)
}

fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= HEADER_LEN && (&data[257..263] == b"ustar\0" || &data[257..263] == b"ustar ")
}
