use std::path::{Path, PathBuf};

use cask_fs::{AtomicWriteOptions, LockFile};

use crate::error::{Result, StateError};
use crate::record::{InstallationRecord, RECORD_SCHEMA};

const RECORD_EXT: &str = "json";
const LOCK_EXT: &str = "lock";

/// Holds a package's lock until dropped.
#[derive(Debug)]
pub struct PackageLock {
    _file: Option<LockFile>,
}

impl PackageLock {
    pub fn held(file: LockFile) -> Self { Self { _file: Some(file) } }

    /// For stores with no cross-process state to protect.
    pub fn unlocked() -> Self { Self { _file: None } }
}

/// Where installation records live.
///
/// Methods block on disk I/O; async callers should run them on a blocking
/// thread.
pub trait StateStore: Send + Sync {
    fn load(&self, package: &str) -> Result<Option<InstallationRecord>>;

    /// Replace the package's record atomically.
    fn save(&self, record: &InstallationRecord) -> Result<()>;

    /// Delete the record. Deleting a missing record succeeds.
    fn remove(&self, package: &str) -> Result<()>;

    /// Every readable record, ordered by package name.
    fn list(&self) -> Result<Vec<InstallationRecord>>;

    /// Block until this process holds the package's lock.
    fn lock(&self, package: &str) -> Result<PackageLock>;
}

/// Records as `<dir>/<name>.json`, locks as `<dir>/<name>.lock`.
#[derive(Debug, Clone)]
pub struct FsStateStore {
    dir: PathBuf,
}

impl FsStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn record_path(&self, package: &str) -> Result<PathBuf> {
        check_name(package)?;
        Ok(self.dir.join(format!("{package}.{RECORD_EXT}")))
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            StateError::Fs(cask_fs::Error::Write {
                path:   self.dir.clone(),
                source: e,
            })
        })
    }

    fn read(&self, path: &Path) -> Result<InstallationRecord> {
        let bytes = cask_fs::atomic_read(path)?;
        let record: InstallationRecord = serde_json::from_slice(&bytes).map_err(|e| StateError::Corrupt {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if record.schema > RECORD_SCHEMA {
            return Err(StateError::UnsupportedSchema {
                path:      path.to_path_buf(),
                found:     record.schema,
                supported: RECORD_SCHEMA,
            });
        }
        Ok(record)
    }
}

impl StateStore for FsStateStore {
    fn load(&self, package: &str) -> Result<Option<InstallationRecord>> {
        let path = self.record_path(package)?;
        if !path.exists() {
            return Ok(None);
        }
        self.read(&path).map(Some)
    }

    fn save(&self, record: &InstallationRecord) -> Result<()> {
        let path = self.record_path(&record.package_name)?;
        self.ensure_dir()?;
        let bytes = serde_json::to_vec_pretty(record).map_err(|e| StateError::Encode {
            package: record.package_name.clone(),
            reason:  e.to_string(),
        })?;
        cask_fs::atomic_write(&path, &bytes, AtomicWriteOptions::new().sync(true))?;
        tracing::debug!(path = %path.display(), "record saved");
        Ok(())
    }

    fn remove(&self, package: &str) -> Result<()> {
        let path = self.record_path(package)?;
        if cask_fs::remove_file_if_exists(&path)? {
            tracing::debug!(path = %path.display(), "record removed");
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<InstallationRecord>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StateError::Fs(cask_fs::Error::Read {
                    path:   self.dir.clone(),
                    source: e,
                }));
            }
        };

        let mut records = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            match self.read(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }
        records.sort_by(|a, b| a.package_name.cmp(&b.package_name));
        Ok(records)
    }

    fn lock(&self, package: &str) -> Result<PackageLock> {
        check_name(package)?;
        self.ensure_dir()?;
        let file = LockFile::acquire(self.dir.join(format!("{package}.{LOCK_EXT}")))?;
        Ok(PackageLock::held(file))
    }
}

/// Package names become file names; refuse anything that could escape `dir`.
fn check_name(package: &str) -> Result<()> {
    let valid = !package.is_empty()
        && !package.starts_with('.')
        && !package.contains(['/', '\\', '\0', ':']);
    if valid {
        Ok(())
    } else {
        Err(StateError::InvalidName(package.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_verify::Sha256Digest;
    use tempfile::tempdir;

    fn record(name: &str, version: &str) -> InstallationRecord {
        InstallationRecord::new(name, version, format!("https://example.com/{name}"), true)
            .with_path(format!("/opt/bin/{name}"), Sha256Digest::of(name.as_bytes()))
    }

    #[test]
    fn test_save_load_remove() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path().join("receipts"));

        assert_eq!(store.load("unitrack").unwrap(), None);

        let saved = record("unitrack", "0.2.2");
        store.save(&saved).unwrap();
        assert_eq!(store.load("unitrack").unwrap(), Some(saved));

        store.remove("unitrack").unwrap();
        assert_eq!(store.load("unitrack").unwrap(), None);
        store.remove("unitrack").unwrap();
    }

    #[test]
    fn test_save_replaces_previous() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path());

        store.save(&record("tool", "1.0")).unwrap();
        store.save(&record("tool", "2.0")).unwrap();

        assert_eq!(store.load("tool").unwrap().unwrap().installed_version, "2.0");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_list_sorted_and_skips_garbage() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path());
        store.save(&record("zeta", "1")).unwrap();
        store.save(&record("alpha", "1")).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.package_name).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path());
        std::fs::write(dir.path().join("tool.json"), "[]").unwrap();
        assert!(matches!(store.load("tool"), Err(StateError::Corrupt { .. })));
    }

    #[test]
    fn test_newer_schema_rejected() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path());
        let mut future = record("tool", "1.0");
        future.schema = RECORD_SCHEMA + 1;
        store.save(&future).unwrap();
        assert!(matches!(store.load("tool"), Err(StateError::UnsupportedSchema { found: 2, .. })));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path());
        for name in ["", "../escape", "a/b", "a\\b", ".hidden"] {
            assert!(matches!(store.load(name), Err(StateError::InvalidName(_))), "{name}");
        }
    }

    #[test]
    fn test_lock_excludes_second_holder() {
        let dir = tempdir().unwrap();
        let store = FsStateStore::new(dir.path());
        let lock_path = dir.path().join("tool.lock");

        let held = store.lock("tool").unwrap();
        assert!(matches!(
            LockFile::try_acquire(&lock_path),
            Err(cask_fs::Error::WouldBlock { .. })
        ));
        drop(held);
        assert!(LockFile::try_acquire(&lock_path).is_ok());
    }
}
