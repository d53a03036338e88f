use std::path::PathBuf;

use cask_install::InstallError;

use super::{Context, load_manifest};

/// Show what `install` would do without downloading anything.
#[derive(Debug, clap::Args)]
pub struct DryRun {
    /// Manifest file, TOML or `.json`.
    manifest: PathBuf,
    /// Plan for this version instead of the manifest's.
    #[arg(long)]
    version:  Option<String>,
}

impl DryRun {
    pub async fn run(self, ctx: &Context) -> anyhow::Result<u8> {
        let manifest = load_manifest(&self.manifest)?;
        let version = self.version.as_deref().unwrap_or(manifest.version());
        manifest.validate().map_err(InstallError::from)?;
        let artifact = cask_resolve::resolve(&manifest, version).map_err(InstallError::from)?;

        let installer = ctx.installer(ctx.options())?;
        let action = installer.plan(&artifact, &manifest).await?;

        println!("{} {}: {action}", artifact.package, artifact.version);
        println!("  url        {}", artifact.concrete_url);
        match &artifact.expected_hash {
            Some(digest) => println!("  integrity  sha256:{}", digest.to_hex()),
            None => println!("  integrity  unchecked"),
        }
        for binary in manifest.binaries() {
            println!("  binary     {} -> {}", binary.source(), installer.bin_dir().join(binary.target()).display());
        }
        Ok(0)
    }
}
