use std::path::PathBuf;

use cask_install::InstallError;

use super::load_manifest;

/// Parse and validate a manifest, touching nothing else.
#[derive(Debug, clap::Args)]
pub struct Lint {
    /// Manifest file, TOML or `.json`.
    manifest: PathBuf,
}

impl Lint {
    pub fn run(self) -> anyhow::Result<u8> {
        let manifest = load_manifest(&self.manifest)?;
        manifest.validate().map_err(InstallError::from)?;
        let artifact = cask_resolve::resolve_default(&manifest).map_err(InstallError::from)?;

        println!("{}: ok", self.manifest.display());
        println!("  package    {} {}", manifest.name(), manifest.version());
        println!("  url        {}", artifact.concrete_url);
        println!(
            "  integrity  {}",
            if artifact.is_verified() { "sha256" } else { "unchecked" }
        );
        let binaries = manifest
            .binaries()
            .iter()
            .map(|b| b.target())
            .collect::<Vec<_>>()
            .join(", ");
        println!("  binaries   {binaries}");
        Ok(0)
    }
}
