use std::fmt;
use std::path::PathBuf;

use cask_state::InstallationRecord;

/// What [`crate::Installer::install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Nothing was installed before.
    Installed(InstallationRecord),
    /// A different version was replaced.
    Upgraded {
        previous_version: String,
        record:           InstallationRecord,
    },
    /// Same version, reinstalled because files were missing or altered, or
    /// the artifact changed.
    Reinstalled(InstallationRecord),
    /// The recorded install already matched; nothing was downloaded or written.
    AlreadyInstalled(InstallationRecord),
}

impl InstallOutcome {
    pub fn record(&self) -> &InstallationRecord {
        match self {
            InstallOutcome::Installed(record)
            | InstallOutcome::Upgraded { record, .. }
            | InstallOutcome::Reinstalled(record)
            | InstallOutcome::AlreadyInstalled(record) => record,
        }
    }

    /// Whether the call changed anything on disk.
    pub fn changed(&self) -> bool { !matches!(self, InstallOutcome::AlreadyInstalled(_)) }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        let (name, version) = (&record.package_name, &record.installed_version);
        match self {
            InstallOutcome::Installed(_) => write!(f, "installed {name} {version}"),
            InstallOutcome::Upgraded {
                previous_version, ..
            } => write!(f, "upgraded {name} {previous_version} -> {version}"),
            InstallOutcome::Reinstalled(_) => write!(f, "reinstalled {name} {version}"),
            InstallOutcome::AlreadyInstalled(_) => write!(f, "{name} {version} is already installed"),
        }
    }
}

/// Result of an uninstall. A non-empty `remaining` means the record was kept
/// and now lists only those paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub package:   String,
    pub version:   String,
    pub removed:   Vec<PathBuf>,
    pub remaining: Vec<PathBuf>,
}

impl UninstallReport {
    pub fn is_complete(&self) -> bool { self.remaining.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    Installed { version: String },
    NotInstalled,
    Corrupted {
        missing: Vec<PathBuf>,
        /// Present, but the content no longer matches the recorded checksum.
        altered: Vec<PathBuf>,
    },
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStatus::Installed { version } => write!(f, "installed ({version})"),
            InstallStatus::NotInstalled => write!(f, "not installed"),
            InstallStatus::Corrupted { missing, altered } => {
                write!(f, "corrupted ({} missing, {} altered)", missing.len(), altered.len())
            }
        }
    }
}

/// What `install` would do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Install,
    Upgrade { from: String },
    Reinstall,
    NoOp,
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::Install => write!(f, "install"),
            PlannedAction::Upgrade { from } => write!(f, "upgrade from {from}"),
            PlannedAction::Reinstall => write!(f, "reinstall"),
            PlannedAction::NoOp => write!(f, "nothing to do"),
        }
    }
}
