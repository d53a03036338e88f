//! Pure helpers with no I/O.

mod retry;

pub use retry::retry_delay;

/// Returns `true` for a 2xx status.
pub fn is_success(status: u16) -> bool { (200..300).contains(&status) }
