use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::detect::{ArtifactFormat, detect_file};
use crate::error::{Error, Result};
use crate::sanitize::normalize_entry_path;

#[cfg(feature = "tar")]
mod tar;
#[cfg(feature = "zip")]
mod zip;

/// One wanted entry, written into the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// Archive-internal path as requested.
    pub source: String,
    pub path:   PathBuf,
    pub size:   u64,
}

/// Extract the named `sources` from `artifact` into `staging_dir`.
///
/// `file_name` is the name the artifact was published under; a raw
/// artifact's only entry carries that name. Entries are staged as
/// `entry-<n>` in the order of `sources`, so two sources sharing a base
/// name never collide. Fails with [`Error::MissingEntry`] naming the first
/// source not found.
pub fn extract_entries(
    artifact: &Path,
    file_name: &str,
    sources: &[&str],
    staging_dir: &Path,
) -> Result<Vec<StagedEntry>> {
    let format = detect_file(artifact, file_name)?;
    tracing::debug!(artifact = %artifact.display(), %format, "extracting entries");

    let mut wanted = Wanted::new(sources, staging_dir);
    match format {
        ArtifactFormat::Raw => wanted.offer(file_name, || open(artifact))?,
        ArtifactFormat::Gzip => {
            let inner = file_name.strip_suffix(".gz").unwrap_or(file_name);
            wanted.offer(inner, || gunzip(artifact))?;
        }
        #[cfg(feature = "tar")]
        ArtifactFormat::Tar => tar::extract(open(artifact)?, &mut wanted)?,
        #[cfg(feature = "tar")]
        ArtifactFormat::TarGz => tar::extract(gunzip(artifact)?, &mut wanted)?,
        #[cfg(feature = "zip")]
        ArtifactFormat::Zip => zip::extract(open(artifact)?, &mut wanted)?,
        #[allow(unreachable_patterns)]
        other => return Err(Error::UnsupportedFormat(other.as_str())),
    }
    wanted.finish()
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::Read {
        path:   path.to_path_buf(),
        source: e,
    })
}

#[cfg(feature = "tar")]
fn gunzip(path: &Path) -> Result<flate2::read::GzDecoder<File>> {
    Ok(flate2::read::GzDecoder::new(open(path)?))
}

#[cfg(not(feature = "tar"))]
fn gunzip(_path: &Path) -> Result<File> { Err(Error::UnsupportedFormat("gzip")) }

/// Book-keeping for the entries still to be found.
pub(crate) struct Wanted<'a> {
    sources: &'a [&'a str],
    index:   HashMap<String, usize>,
    staged:  Vec<Option<StagedEntry>>,
    dir:     &'a Path,
}

impl<'a> Wanted<'a> {
    fn new(sources: &'a [&'a str], dir: &'a Path) -> Self {
        let mut index = HashMap::new();
        for (i, source) in sources.iter().enumerate() {
            let key = normalize_entry_path(Path::new(source)).unwrap_or_else(|| source.to_string());
            index.entry(key).or_insert(i);
        }
        Self {
            sources,
            index,
            staged: vec![None; sources.len()],
            dir,
        }
    }

    /// Slot for an archive entry path, if it is one we want.
    pub(crate) fn slot(&self, entry_path: &Path) -> Option<usize> {
        let normalized = normalize_entry_path(entry_path)?;
        self.index.get(&normalized).copied()
    }

    pub(crate) fn source(&self, slot: usize) -> &str { self.sources[slot] }

    pub(crate) fn is_complete(&self) -> bool { self.index.values().all(|&i| self.staged[i].is_some()) }

    /// Offer a raw entry under `name`; opened lazily only when wanted.
    fn offer<R: Read>(&mut self, name: &str, open: impl FnOnce() -> Result<R>) -> Result<()> {
        if let Some(slot) = self.slot(Path::new(name)) {
            let mut reader = open()?;
            self.write(slot, &mut reader)?;
        }
        Ok(())
    }

    /// Copy one wanted entry into the staging directory.
    pub(crate) fn write(&mut self, slot: usize, reader: &mut impl Read) -> Result<()> {
        let path = self.dir.join(format!("entry-{slot}"));
        let write_err = |e: io::Error| Error::Write {
            path:   path.clone(),
            source: e,
        };
        let mut out = File::create(&path).map_err(write_err)?;
        let size = io::copy(reader, &mut out).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => Error::Corrupted(e.to_string()),
            _ => write_err(e),
        })?;
        out.sync_all().map_err(write_err)?;

        tracing::trace!(source = self.sources[slot], path = %path.display(), size, "staged entry");
        self.staged[slot] = Some(StagedEntry {
            source: self.sources[slot].to_string(),
            path,
            size,
        });
        Ok(())
    }

    fn finish(self) -> Result<Vec<StagedEntry>> {
        let mut entries: Vec<StagedEntry> = Vec::with_capacity(self.staged.len());
        for (i, staged) in self.staged.into_iter().enumerate() {
            let source = self.sources[i];
            let entry = match staged {
                Some(entry) => entry,
                None => {
                    // A repeated source gets its own copy of the first occurrence.
                    let first = normalize_entry_path(Path::new(source))
                        .and_then(|key| self.index.get(&key).copied())
                        .filter(|&first| first < i);
                    let Some(first) = first else {
                        return Err(Error::MissingEntry {
                            entry: source.to_string(),
                        });
                    };
                    let path = self.dir.join(format!("entry-{i}"));
                    let size = std::fs::copy(&entries[first].path, &path).map_err(|e| Error::Write {
                        path:   path.clone(),
                        source: e,
                    })?;
                    StagedEntry {
                        source: source.to_string(),
                        path,
                        size,
                    }
                }
            };
            entries.push(entry);
        }
        Ok(entries)
    }
}
