use super::{Context, EXIT_INCOMPLETE_UNINSTALL};

/// Remove an installed package and its record.
#[derive(Debug, clap::Args)]
pub struct Uninstall {
    /// Package name.
    name: String,
}

impl Uninstall {
    pub async fn run(self, ctx: &Context) -> anyhow::Result<u8> {
        let installer = ctx.installer(ctx.options())?;
        let report = installer.uninstall(&self.name).await?;

        if report.is_complete() {
            println!("uninstalled {} {}", report.package, report.version);
            return Ok(0);
        }

        eprintln!(
            "uninstall of {} {} incomplete, {} file(s) could not be removed:",
            report.package,
            report.version,
            report.remaining.len()
        );
        for path in &report.remaining {
            eprintln!("  {}", path.display());
        }
        Ok(EXIT_INCOMPLETE_UNINSTALL)
    }
}
