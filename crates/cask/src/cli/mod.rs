use std::path::{Path, PathBuf};

use anyhow::Context as _;

use cask_fetch::ReqwestClient;
use cask_install::{InstallError, Installer, InstallerOptions};
use cask_manifest::Manifest;
use cask_state::FsStateStore;
use clap::{Parser, Subcommand};

use crate::config::Config;

mod dry_run;
mod install;
mod lint;
mod list;
mod uninstall;
mod verify;

/// Exit code of an uninstall that left some files behind.
pub const EXIT_INCOMPLETE_UNINSTALL: u8 = 21;

#[derive(Debug, Parser)]
#[command(name = "cask", version, about = "Install prebuilt binaries described by a manifest")]
pub struct App {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    command:    Commands,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Directory binaries are placed in.
    #[arg(long, global = true, value_name = "DIR")]
    pub bin_dir:   Option<PathBuf>,
    /// Directory holding installation records.
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,
    /// Scratch directory for downloads.
    #[arg(long, global = true, value_name = "DIR")]
    pub work_dir:  Option<PathBuf>,
    /// Download timeout in seconds, 0 for none.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout:   Option<u64>,
    /// Configuration file to read instead of the default one.
    #[arg(long, global = true, value_name = "FILE")]
    pub config:    Option<PathBuf>,
    /// More output; repeat for more.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose:   u8,
    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet:     bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Install(install::Install),
    Uninstall(uninstall::Uninstall),
    Verify(verify::Verify),
    DryRun(dry_run::DryRun),
    Lint(lint::Lint),
    List(list::List),
}

impl App {
    pub async fn run(self) -> anyhow::Result<u8> {
        let Self { global, command } = self;
        let ctx = || Context::new(global);
        match command {
            Commands::Install(cmd) => cmd.run(&ctx()?).await,
            Commands::Uninstall(cmd) => cmd.run(&ctx()?).await,
            Commands::Verify(cmd) => cmd.run(&ctx()?).await,
            Commands::DryRun(cmd) => cmd.run(&ctx()?).await,
            Commands::List(cmd) => cmd.run(&ctx()?).await,
            Commands::Lint(cmd) => cmd.run(),
        }
    }
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<InstallError>() {
        Some(err) => err.kind().exit_code(),
        None => 1,
    }
}

/// Configuration with command-line overrides applied.
pub struct Context {
    pub config: Config,
    pub quiet:  bool,
}

impl Context {
    fn new(global: GlobalArgs) -> anyhow::Result<Self> {
        let mut config = Config::load(global.config.as_deref())?;
        if let Some(dir) = global.bin_dir {
            config.bin_dir = dir;
        }
        if let Some(dir) = global.state_dir {
            config.state_dir = dir;
        }
        if let Some(dir) = global.work_dir {
            config.work_dir = dir;
        }
        if let Some(secs) = global.timeout {
            config.timeout_secs = secs;
        }
        for dir in [&mut config.bin_dir, &mut config.state_dir, &mut config.work_dir] {
            *dir = absolute(dir)?;
        }
        tracing::debug!(?config, "configuration");

        Ok(Self { config, quiet: global.quiet })
    }

    pub fn options(&self) -> InstallerOptions {
        InstallerOptions::default()
            .timeout(self.config.timeout())
            .max_retries(self.config.retries)
    }

    pub fn installer(&self, options: InstallerOptions) -> anyhow::Result<Installer<ReqwestClient, FsStateStore>> {
        let installer = Installer::new(
            ReqwestClient::new()?,
            FsStateStore::new(&self.config.state_dir),
            &self.config.bin_dir,
            &self.config.work_dir,
        );
        Ok(installer.with_options(options))
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve directory `{}`", path.display()))
}

/// Load a manifest, keeping the error classifiable for [`exit_code`].
fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    cask_manifest::load(path).map_err(|e| InstallError::from(e).into())
}

#[cfg(test)]
mod tests {
    use cask_manifest::ManifestError;

    use super::*;

    #[test]
    fn test_parse_global_after_subcommand() {
        let app = App::try_parse_from(["cask", "install", "unitrack.toml", "--bin-dir", "/tmp/bin", "-vv"]).unwrap();
        assert_eq!(app.global.bin_dir, Some(PathBuf::from("/tmp/bin")));
        assert_eq!(app.global.verbose, 2);
        assert!(matches!(app.command, Commands::Install(_)));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(App::try_parse_from(["cask", "-q", "-v", "list"]).is_err());
    }

    #[test]
    fn test_exit_code_from_install_error() {
        let err: anyhow::Error = InstallError::NotInstalled {
            package: "unitrack".into(),
        }
        .into();
        assert_eq!(exit_code(&err), 18);

        let err: anyhow::Error = InstallError::from(ManifestError::Malformed {
            reason: "expected `=`".into(),
        })
        .into();
        assert_eq!(exit_code(&err.context("while loading")), 10);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn test_config_dirs_made_absolute() {
        let app = App::try_parse_from([
            "cask",
            "list",
            "--bin-dir",
            "bin",
            "--state-dir",
            "state",
            "--work-dir",
            "work",
            "--config",
            "/nonexistent/config.toml",
        ])
        .unwrap();
        let ctx = Context::new(app.global).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(ctx.config.bin_dir, cwd.join("bin"));
        assert_eq!(ctx.config.state_dir, cwd.join("state"));
        assert_eq!(ctx.config.work_dir, cwd.join("work"));
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let err = load_manifest(Path::new("/nonexistent/unitrack.toml")).unwrap_err();
        assert!(err.downcast_ref::<InstallError>().is_some());
    }
}
