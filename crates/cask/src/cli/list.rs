use super::Context;
use crate::ui::{Formatter, RecordRow};

/// Show every installed package.
#[derive(Debug, clap::Args)]
pub struct List {
    /// Omit the column names.
    #[arg(long)]
    no_header: bool,
}

impl List {
    pub async fn run(self, ctx: &Context) -> anyhow::Result<u8> {
        let installer = ctx.installer(ctx.options())?;
        let records = installer.list().await?;
        if records.is_empty() {
            println!("no packages installed");
            return Ok(0);
        }

        let table = Formatter {
            header:   None,
            footer:   Some(format!("{} package(s)", records.len())),
            no_names: self.no_header,
        }
        .build(records.iter().map(RecordRow::from));
        println!("{table}");
        Ok(0)
    }
}
