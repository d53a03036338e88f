//! Install, upgrade, uninstall and verify manifest-described binaries.
//!
//! Every operation is all-or-nothing with respect to the binary directory
//! and the record store: either the new files and their record are both in
//! place, or neither changed. The one exception is reported explicitly as
//! [`InstallError::InconsistentState`].
//!
//! ```no_run
//! use cask_fetch::ReqwestClient;
//! use cask_install::Installer;
//! use cask_state::FsStateStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = cask_manifest::load("unitrack.toml")?;
//! let installer = Installer::new(
//!     ReqwestClient::new()?,
//!     FsStateStore::new("/var/lib/cask/receipts"),
//!     "/usr/local/bin",
//!     "/var/cache/cask",
//! );
//! let outcome = installer.install_manifest(&manifest, manifest.version()).await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

mod error;
mod installer;
mod options;
mod outcome;
mod placement;
mod plan;

pub use error::{ErrorKind, InstallError, Result};
pub use installer::Installer;
pub use options::InstallerOptions;
pub use outcome::{InstallOutcome, InstallStatus, PlannedAction, UninstallReport};
