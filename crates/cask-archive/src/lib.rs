//! Artifact format detection and named-entry extraction.
//!
//! An installer only ever needs a handful of files out of a release
//! artifact. [`extract_entries`] pulls exactly those, by archive-internal
//! path, into a staging directory and reports each as missing or present.
//! Nothing else in the archive is written to disk.
//!
//! Supported: raw binaries, `tar`, `tar.gz`, single-file `.gz` and `zip`.

mod detect;
mod error;
mod extract;
mod sanitize;

pub use detect::{ArtifactFormat, detect, detect_file};
pub use error::{Error, Result};
pub use extract::{StagedEntry, extract_entries};
pub use sanitize::normalize_entry_path;
