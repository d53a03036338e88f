use cask_fetch::{FetchPhase, Progress};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Download progress bar, fed from the fetcher's progress callback.
///
/// Cheap to clone; clones drive the same bar.
#[derive(Clone)]
pub struct DownloadTracker {
    pb: ProgressBar,
}

impl DownloadTracker {
    pub fn update(&self, progress: &Progress) {
        if let Some(total) = progress.total_bytes {
            self.pb.set_length(total);
        }
        self.pb.set_position(progress.bytes_downloaded);
        match progress.phase {
            FetchPhase::Connecting if progress.retry_count > 0 => {
                self.pb.set_message(format!("retry {}", progress.retry_count));
            }
            FetchPhase::Verifying => self.pb.set_message("verifying"),
            _ => {}
        }
    }

    pub fn finish(&self) { self.pb.finish_and_clear(); }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadTrackerBuilder {
    prefix: Option<String>,
    hidden: bool,
}

impl DownloadTrackerBuilder {
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn build(self) -> DownloadTracker {
        let pb = ProgressBar::new(0);
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        let pb = match PB_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        DownloadTracker { pb }
    }
}
