use cask_fs::{
    AtomicWriteOptions, HardlinkOrCopyOptions, ReplaceOptions, Workspace, atomic_read,
    atomic_write, hardlink_or_copy, replace_file,
};
use tempfile::tempdir;

#[test]
fn test_atomic_write_replaces_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("existing.txt");

    std::fs::write(&path, "original").unwrap();
    atomic_write(&path, b"new content", AtomicWriteOptions::new()).unwrap();

    assert_eq!(atomic_read(&path).unwrap(), b"new content");
}

#[test]
fn test_backup_then_replace_then_restore() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("tool");
    std::fs::write(&target, "v1").unwrap();

    let workspace = Workspace::new_in(dir.path(), ".stage-").unwrap();
    let staged = workspace.join("tool");
    let backup = workspace.join("tool.backup");
    std::fs::write(&staged, "v2").unwrap();

    hardlink_or_copy(&target, &backup, HardlinkOrCopyOptions::new()).unwrap();
    replace_file(&staged, &target, ReplaceOptions::new()).unwrap();
    assert_eq!(atomic_read(&target).unwrap(), b"v2");

    replace_file(&backup, &target, ReplaceOptions::new()).unwrap();
    assert_eq!(atomic_read(&target).unwrap(), b"v1");

    workspace.close().unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[cfg(unix)]
#[test]
fn test_hardlink_shares_inode() {
    use std::os::unix::fs::MetadataExt;

    let dir = tempdir().unwrap();
    let src = dir.path().join("source.txt");
    let dest = dir.path().join("hardlink.txt");
    std::fs::write(&src, "shared content").unwrap();

    hardlink_or_copy(&src, &dest, HardlinkOrCopyOptions::new()).unwrap();

    let src_meta = std::fs::metadata(&src).unwrap();
    let dest_meta = std::fs::metadata(&dest).unwrap();
    assert_eq!(src_meta.ino(), dest_meta.ino());
}
