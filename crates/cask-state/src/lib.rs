//! Persisted installation records.
//!
//! One JSON record per package, written atomically, plus a sibling lock
//! file that serializes every mutation of that package.

mod error;
mod record;
mod store;

pub use error::{Result, StateError};
pub use record::{InstallationRecord, RECORD_SCHEMA};
pub use store::{FsStateStore, PackageLock, StateStore};
