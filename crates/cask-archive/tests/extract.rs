use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cask_archive::{Error, extract_entries};
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (path, data) in entries {
        writer.start_file(*path, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn setup(name: &str, bytes: &[u8]) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join(name);
    fs::write(&artifact, bytes).unwrap();
    let staging = dir.path().join("staging");
    fs::create_dir(&staging).unwrap();
    (dir, artifact, staging)
}

fn read(path: &Path) -> Vec<u8> { fs::read(path).unwrap() }

#[test]
fn test_raw_artifact_is_its_own_entry() {
    let (_dir, artifact, staging) = setup("unitrack", b"\x7fELF binary");

    let staged = extract_entries(&artifact, "unitrack", &["unitrack"], &staging).unwrap();

    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].source, "unitrack");
    assert_eq!(read(&staged[0].path), b"\x7fELF binary");
    assert!(artifact.exists());
}

#[test]
fn test_raw_artifact_missing_other_entry() {
    let (_dir, artifact, staging) = setup("unitrack", b"\x7fELF binary");

    let err = extract_entries(&artifact, "unitrack", &["unitrack", "unitrack-helper"], &staging)
        .unwrap_err();

    assert!(matches!(err, Error::MissingEntry { entry } if entry == "unitrack-helper"));
}

#[test]
fn test_tar_gz_extracts_only_wanted_entries() {
    let tar = tar_bytes(&[
        ("tool-1.0/README.md", b"docs"),
        ("tool-1.0/bin/tool", b"tool binary"),
        ("tool-1.0/bin/toolctl", b"ctl binary"),
    ]);
    let (_dir, artifact, staging) = setup("tool-1.0.tar.gz", &gzip(&tar));

    let staged = extract_entries(
        &artifact,
        "tool-1.0.tar.gz",
        &["tool-1.0/bin/toolctl", "tool-1.0/bin/tool"],
        &staging,
    )
    .unwrap();

    assert_eq!(read(&staged[0].path), b"ctl binary");
    assert_eq!(read(&staged[1].path), b"tool binary");
    assert_eq!(staged[1].size, 11);
    assert_eq!(fs::read_dir(&staging).unwrap().count(), 2);
}

#[test]
fn test_plain_tar_with_dot_prefix() {
    let tar = tar_bytes(&[("./tool", b"tool binary")]);
    let (_dir, artifact, staging) = setup("tool.tar", &tar);

    let staged = extract_entries(&artifact, "tool.tar", &["tool"], &staging).unwrap();

    assert_eq!(read(&staged[0].path), b"tool binary");
}

#[test]
fn test_tar_missing_entry() {
    let tar = tar_bytes(&[("bin/tool", b"tool binary")]);
    let (_dir, artifact, staging) = setup("tool.tar.gz", &gzip(&tar));

    let err = extract_entries(&artifact, "tool.tar.gz", &["bin/tool", "bin/absent"], &staging)
        .unwrap_err();

    assert!(matches!(err, Error::MissingEntry { entry } if entry == "bin/absent"));
}

#[test]
fn test_zip_extracts_entries() {
    let zip = zip_bytes(&[("tool.exe", b"windows binary"), ("LICENSE", b"mit")]);
    let (_dir, artifact, staging) = setup("tool.zip", &zip);

    let staged = extract_entries(&artifact, "tool.zip", &["tool.exe"], &staging).unwrap();

    assert_eq!(read(&staged[0].path), b"windows binary");
}

#[test]
fn test_single_gzip_file() {
    let (_dir, artifact, staging) = setup("tool.gz", &gzip(b"tool binary"));

    let staged = extract_entries(&artifact, "tool.gz", &["tool"], &staging).unwrap();

    assert_eq!(read(&staged[0].path), b"tool binary");
}

#[test]
fn test_same_source_for_two_targets() {
    let tar = tar_bytes(&[("bin/tool", b"tool binary")]);
    let (_dir, artifact, staging) = setup("tool.tar", &tar);

    let staged = extract_entries(&artifact, "tool.tar", &["bin/tool", "bin/tool"], &staging).unwrap();

    assert_eq!(staged.len(), 2);
    assert_ne!(staged[0].path, staged[1].path);
    assert_eq!(read(&staged[0].path), read(&staged[1].path));
}

#[test]
fn test_corrupted_gzip() {
    let mut bytes = gzip(&tar_bytes(&[("bin/tool", b"tool binary")]));
    let len = bytes.len();
    bytes.truncate(len / 2);
    let (_dir, artifact, staging) = setup("tool.tar.gz", &bytes);

    let err = extract_entries(&artifact, "tool.tar.gz", &["bin/tool"], &staging).unwrap_err();

    assert!(matches!(err, Error::Corrupted(_) | Error::MissingEntry { .. }));
}
