//! Read-only decisions: what is on disk versus what a record claims.

use std::path::{Path, PathBuf};

use cask_resolve::ResolvedArtifact;
use cask_state::InstallationRecord;

use crate::outcome::{InstallStatus, PlannedAction};

#[derive(Debug, Default)]
pub(crate) struct FileCheck {
    pub missing: Vec<PathBuf>,
    pub altered: Vec<PathBuf>,
}

impl FileCheck {
    pub fn is_intact(&self) -> bool { self.missing.is_empty() && self.altered.is_empty() }

    pub fn into_status(self, version: &str) -> InstallStatus {
        if self.is_intact() {
            InstallStatus::Installed {
                version: version.to_string(),
            }
        } else {
            InstallStatus::Corrupted {
                missing: self.missing,
                altered: self.altered,
            }
        }
    }
}

/// Hash every recorded file against its recorded checksum. Files recorded
/// without a checksum only need to exist.
pub(crate) fn check_files(record: &InstallationRecord) -> FileCheck {
    let mut check = FileCheck::default();
    for path in &record.installed_paths {
        if !path.is_file() {
            check.missing.push(path.clone());
            continue;
        }
        let Some(expected) = record.checksum(path) else {
            continue;
        };
        match cask_verify::hash_file(path) {
            Ok(actual) if actual == expected => {}
            Ok(_) => check.altered.push(path.clone()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot hash installed file");
                check.altered.push(path.clone());
            }
        }
    }
    check
}

/// The record describes exactly this artifact installed at these targets.
pub(crate) fn matches_artifact(
    record: &InstallationRecord,
    artifact: &ResolvedArtifact,
    targets: &[PathBuf],
) -> bool {
    record.installed_version == artifact.version
        && record.artifact_url == artifact.concrete_url.as_str()
        && record.installed_paths == targets
}

pub(crate) fn plan(
    record: Option<&InstallationRecord>,
    artifact: &ResolvedArtifact,
    targets: &[PathBuf],
) -> PlannedAction {
    match record {
        None => PlannedAction::Install,
        Some(record) if record.installed_version != artifact.version => PlannedAction::Upgrade {
            from: record.installed_version.clone(),
        },
        Some(record) if matches_artifact(record, artifact, targets) && check_files(record).is_intact() => {
            PlannedAction::NoOp
        }
        Some(_) => PlannedAction::Reinstall,
    }
}

/// First target that exists on disk but is not owned by `previous`.
pub(crate) fn find_conflict(previous: Option<&InstallationRecord>, targets: &[PathBuf]) -> Option<PathBuf> {
    targets
        .iter()
        .find(|target| exists(target) && !previous.is_some_and(|record| record.owns(target)))
        .cloned()
}

fn exists(path: &Path) -> bool { std::fs::symlink_metadata(path).is_ok() }

#[cfg(test)]
mod tests {
    use super::*;
    use cask_verify::Sha256Digest;
    use tempfile::tempdir;
    use url::Url;

    fn artifact(version: &str) -> ResolvedArtifact {
        ResolvedArtifact {
            package:       "tool".into(),
            version:       version.into(),
            concrete_url:  Url::parse(&format!("https://example.com/{version}/tool")).unwrap(),
            expected_hash: None,
            file_name:     "tool".into(),
        }
    }

    fn installed(dir: &Path, version: &str, content: &[u8]) -> (InstallationRecord, Vec<PathBuf>) {
        let path = dir.join("tool");
        std::fs::write(&path, content).unwrap();
        let record = InstallationRecord::new("tool", version, artifact(version).concrete_url.as_str(), false)
            .with_path(&path, Sha256Digest::of(content));
        (record, vec![path])
    }

    #[test]
    fn test_plan_fresh_install() {
        let dir = tempdir().unwrap();
        let targets = vec![dir.path().join("tool")];
        assert_eq!(plan(None, &artifact("1.0"), &targets), PlannedAction::Install);
    }

    #[test]
    fn test_plan_noop_upgrade_reinstall() {
        let dir = tempdir().unwrap();
        let (record, targets) = installed(dir.path(), "1.0", b"v1");

        assert_eq!(plan(Some(&record), &artifact("1.0"), &targets), PlannedAction::NoOp);
        assert_eq!(
            plan(Some(&record), &artifact("2.0"), &targets),
            PlannedAction::Upgrade { from: "1.0".into() }
        );

        std::fs::write(&targets[0], b"tampered").unwrap();
        assert_eq!(plan(Some(&record), &artifact("1.0"), &targets), PlannedAction::Reinstall);
    }

    #[test]
    fn test_check_files_reports_missing_and_altered() {
        let dir = tempdir().unwrap();
        let (record, targets) = installed(dir.path(), "1.0", b"v1");
        assert!(check_files(&record).is_intact());

        std::fs::write(&targets[0], b"changed").unwrap();
        let check = check_files(&record);
        assert_eq!(check.altered, targets);

        std::fs::remove_file(&targets[0]).unwrap();
        let check = check_files(&record);
        assert_eq!(check.missing, targets);
        assert!(check.altered.is_empty());
    }

    #[test]
    fn test_find_conflict() {
        let dir = tempdir().unwrap();
        let (record, targets) = installed(dir.path(), "1.0", b"v1");
        let foreign = dir.path().join("foreign");
        std::fs::write(&foreign, b"someone else's").unwrap();
        let fresh = dir.path().join("fresh");

        assert_eq!(find_conflict(Some(&record), &targets), None);
        assert_eq!(find_conflict(None, &targets), Some(targets[0].clone()));
        assert_eq!(find_conflict(Some(&record), &[fresh.clone(), foreign.clone()]), Some(foreign));
        assert_eq!(find_conflict(None, &[fresh]), None);
    }
}
