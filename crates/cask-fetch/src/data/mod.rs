//! Immutable configuration and progress types.

mod options;
mod progress;

pub use options::FetchOptions;
pub use progress::{FetchPhase, Progress};
