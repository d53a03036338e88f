use std::path::PathBuf;

use super::{Context, load_manifest};
use crate::ui::DownloadTrackerBuilder;

/// Install or upgrade the package a manifest describes.
#[derive(Debug, clap::Args)]
pub struct Install {
    /// Manifest file, TOML or `.json`.
    manifest: PathBuf,
    /// Install this version instead of the manifest's.
    #[arg(long)]
    version:  Option<String>,
    /// Overwrite files in the binary directory no installed package owns.
    #[arg(long)]
    force:    bool,
}

impl Install {
    pub async fn run(self, ctx: &Context) -> anyhow::Result<u8> {
        let manifest = load_manifest(&self.manifest)?;
        let version = self.version.as_deref().unwrap_or(manifest.version());
        if !manifest.integrity().is_checked() {
            eprintln!("note: {} has no checksum, the download will not be verified", manifest.name());
        }

        let tracker = DownloadTrackerBuilder::default()
            .with_prefix(manifest.name())
            .hidden(ctx.quiet)
            .build();
        let bar = tracker.clone();
        let options = ctx
            .options()
            .force(self.force)
            .on_progress(move |progress| bar.update(progress));
        let installer = ctx.installer(options)?;

        let result = installer.install_manifest(&manifest, version).await;
        tracker.finish();
        let outcome = result?;

        println!("{outcome}");
        if outcome.changed() {
            for path in &outcome.record().installed_paths {
                println!("  {}", path.display());
            }
        }
        Ok(0)
    }
}
