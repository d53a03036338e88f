use cask_install::{ErrorKind, InstallStatus};

use super::Context;

/// Check an installed package's files against its record.
#[derive(Debug, clap::Args)]
pub struct Verify {
    /// Package name.
    name: String,
}

impl Verify {
    pub async fn run(self, ctx: &Context) -> anyhow::Result<u8> {
        let installer = ctx.installer(ctx.options())?;
        let status = installer.verify_installed(&self.name).await?;
        println!("{}: {status}", self.name);

        Ok(match status {
            InstallStatus::Installed { .. } => 0,
            InstallStatus::NotInstalled => ErrorKind::NotInstalled.exit_code(),
            InstallStatus::Corrupted { missing, altered } => {
                for path in &missing {
                    println!("  missing  {}", path.display());
                }
                for path in &altered {
                    println!("  altered  {}", path.display());
                }
                ErrorKind::Corrupted.exit_code()
            }
        })
    }
}
