use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cask_verify::Sha256Digest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk record format.
pub const RECORD_SCHEMA: u32 = 1;

fn default_schema() -> u32 { RECORD_SCHEMA }

fn default_true() -> bool { true }

/// What a successful install left on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    #[serde(default = "default_schema")]
    pub schema:            u32,
    pub package_name:      String,
    pub installed_version: String,
    /// Absolute paths, in manifest order.
    pub installed_paths:   Vec<PathBuf>,
    pub install_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub artifact_url:      String,
    #[serde(default = "default_true")]
    pub integrity_checked: bool,
    /// Lowercase hex SHA-256 of each installed file.
    #[serde(default)]
    pub checksums:         BTreeMap<PathBuf, String>,
}

impl InstallationRecord {
    pub fn new(
        package_name: impl Into<String>,
        installed_version: impl Into<String>,
        artifact_url: impl Into<String>,
        integrity_checked: bool,
    ) -> Self {
        Self {
            schema: RECORD_SCHEMA,
            package_name: package_name.into(),
            installed_version: installed_version.into(),
            installed_paths: Vec::new(),
            install_timestamp: Utc::now(),
            artifact_url: artifact_url.into(),
            integrity_checked,
            checksums: BTreeMap::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>, digest: Sha256Digest) -> Self {
        let path = path.into();
        self.checksums.insert(path.clone(), digest.to_hex());
        self.installed_paths.push(path);
        self
    }

    pub fn owns(&self, path: &Path) -> bool { self.installed_paths.iter().any(|p| p == path) }

    /// Recorded digest of `path`; `None` when absent or not valid hex.
    pub fn checksum(&self, path: &Path) -> Option<Sha256Digest> {
        self.checksums.get(path)?.parse().ok()
    }

    /// Keep only `remaining` paths, as after a partial uninstall.
    pub fn retain_paths(&mut self, remaining: &[PathBuf]) {
        self.installed_paths.retain(|p| remaining.contains(p));
        self.checksums.retain(|p, _| remaining.contains(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InstallationRecord {
        InstallationRecord::new("unitrack", "0.2.2", "https://example.com/unitrack", false)
            .with_path("/opt/bin/unitrack", Sha256Digest::of(b"unitrack"))
            .with_path("/opt/bin/unitrack-helper", Sha256Digest::of(b"helper"))
    }

    #[test]
    fn test_owns_and_checksum() {
        let record = sample();
        assert!(record.owns(Path::new("/opt/bin/unitrack")));
        assert!(!record.owns(Path::new("/opt/bin/other")));
        assert_eq!(
            record.checksum(Path::new("/opt/bin/unitrack")),
            Some(Sha256Digest::of(b"unitrack"))
        );
        assert_eq!(record.checksum(Path::new("/opt/bin/other")), None);
    }

    #[test]
    fn test_retain_paths() {
        let mut record = sample();
        record.retain_paths(&[PathBuf::from("/opt/bin/unitrack-helper")]);
        assert_eq!(record.installed_paths, vec![PathBuf::from("/opt/bin/unitrack-helper")]);
        assert_eq!(record.checksums.len(), 1);
    }

    #[test]
    fn test_json_shape() {
        let record = sample();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["schema"], 1);
        assert_eq!(json["package_name"], "unitrack");
        assert_eq!(json["installed_version"], "0.2.2");
        assert_eq!(json["integrity_checked"], false);
        assert!(json["install_timestamp"].as_str().unwrap().contains('T'));
        assert_eq!(
            json["checksums"]["/opt/bin/unitrack"],
            Sha256Digest::of(b"unitrack").to_hex()
        );
    }

    #[test]
    fn test_minimal_record_defaults() {
        let json = r#"{
            "package_name": "tool",
            "installed_version": "1.0",
            "installed_paths": ["/bin/tool"],
            "install_timestamp": "2024-05-01T12:00:00Z"
        }"#;
        let record: InstallationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.schema, RECORD_SCHEMA);
        assert!(record.integrity_checked);
        assert!(record.checksums.is_empty());
    }
}
