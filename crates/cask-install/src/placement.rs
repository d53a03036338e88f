//! Moving staged files over their targets, with undo.

use std::path::{Path, PathBuf};

use cask_fs::{HardlinkOrCopyOptions, ReplaceOptions};

struct Applied {
    target: PathBuf,
    /// Hardlink to the file that `target` named before, if any.
    backup: Option<PathBuf>,
}

/// An in-progress set of renames into the binary directory.
///
/// Backups are taken in `backup_dir`, which must be on the same filesystem
/// as the targets. Dropping a `Placement` keeps whatever was applied; call
/// [`Placement::rollback`] to undo.
pub(crate) struct Placement<'a> {
    backup_dir:  &'a Path,
    applied:     Vec<Applied>,
    next_backup: usize,
}

impl<'a> Placement<'a> {
    pub fn new(backup_dir: &'a Path) -> Self {
        Self {
            backup_dir,
            applied: Vec::new(),
            next_backup: 0,
        }
    }

    /// Rename `staged` over `target`, backing up any existing file first.
    pub fn place(&mut self, staged: &Path, target: &Path) -> cask_fs::Result<()> {
        let backup = if std::fs::symlink_metadata(target).is_ok() {
            // Backup names are never reused, even after a failed attempt.
            let backup = self.backup_dir.join(format!("backup-{}", self.next_backup));
            self.next_backup += 1;
            cask_fs::hardlink_or_copy(target, &backup, HardlinkOrCopyOptions::new())?;
            Some(backup)
        } else {
            None
        };

        cask_fs::replace_file(staged, target, ReplaceOptions::new())?;
        tracing::debug!(target = %target.display(), replaced = backup.is_some(), "placed");

        self.applied.push(Applied {
            target: target.to_path_buf(),
            backup,
        });
        Ok(())
    }

    /// Undo every applied rename, newest first. Returns the targets that
    /// could not be restored.
    pub fn rollback(self) -> Result<(), Vec<PathBuf>> {
        let mut stuck = Vec::new();
        for applied in self.applied.into_iter().rev() {
            let restored = match &applied.backup {
                Some(backup) => cask_fs::replace_file(backup, &applied.target, ReplaceOptions::new()),
                None => cask_fs::remove_file_if_exists(&applied.target).map(drop),
            };
            if let Err(e) = restored {
                tracing::error!(target = %applied.target.display(), error = %e, "rollback failed");
                stuck.push(applied.target);
            }
        }
        if stuck.is_empty() { Ok(()) } else { Err(stuck) }
    }
}
