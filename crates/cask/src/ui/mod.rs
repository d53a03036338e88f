mod table;
mod tracker;

pub use table::{Formatter, RecordRow};
pub use tracker::DownloadTrackerBuilder;
