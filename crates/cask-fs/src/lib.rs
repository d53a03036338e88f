//! Atomic filesystem primitives for staged binary installs.
//!
//! - [`atomic_write`] writes through a sibling temp file and a rename
//! - [`replace_file`] moves a fully written file over its final path
//! - [`Workspace`] is a staging directory removed on drop
//! - [`LockFile`] is an exclusive advisory lock released on drop

mod error;
mod lock;
mod primitives;
mod workspace;

pub use error::{Error, Result};
pub use lock::LockFile;
pub use primitives::{
    AtomicWriteOptions, FallbackStrategy, HardlinkOrCopyOptions, ReplaceOptions, atomic_read,
    atomic_write, hardlink_or_copy, remove_file_if_exists, replace_file, set_executable,
};
pub use workspace::Workspace;
