mod atomic_write;
mod hardlink;
mod replace;

pub use atomic_write::{AtomicWriteOptions, atomic_read, atomic_write};
pub use hardlink::{FallbackStrategy, HardlinkOrCopyOptions, hardlink_or_copy};
pub use replace::{ReplaceOptions, remove_file_if_exists, replace_file, set_executable};
