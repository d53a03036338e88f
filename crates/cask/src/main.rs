use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use crate::cli::App;

mod cli;
mod config;
mod dirs;
mod logging;
mod ui;

fn main() -> ExitCode {
    let app = App::parse();
    logging::init(app.global.verbose, app.global.quiet);

    match run(app) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(cli::exit_code(&err))
        }
    }
}

fn run(app: App) -> anyhow::Result<u8> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(app.run())
}
