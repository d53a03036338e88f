//! Package manifest model.
//!
//! A manifest describes one installable package: where its artifact lives
//! (a URL template keyed by version), how the artifact is verified, and
//! which files inside it are installed under which names.
//!
//! ```
//! let manifest = cask_manifest::parse(r#"
//! name = "unitrack"
//! version = "0.2.2"
//! integrity = "unchecked"
//! url = "https://example.com/releases/download/v{version}/unitrack"
//! description = "Linear time tracker Bubble Tea TUI."
//! homepage = "https://example.com/unitrack"
//! binaries = ["unitrack"]
//! "#).unwrap();
//!
//! cask_manifest::validate(&manifest).unwrap();
//! assert_eq!(manifest.binaries()[0].target(), "unitrack");
//! ```

mod error;
mod manifest;
mod raw;
mod template;
mod validate;

pub use error::ManifestError;
pub use manifest::{Binary, Integrity, Manifest};
pub use template::{TemplateError, UrlTemplate, VERSION_PLACEHOLDER};
pub use validate::validate;

use std::path::Path;

/// Parse a manifest from its TOML form.
pub fn parse(source: &str) -> Result<Manifest, ManifestError> {
    let raw: raw::RawManifest = toml::from_str(source).map_err(|e| ManifestError::Malformed {
        reason: e.message().to_string(),
    })?;
    raw.into_manifest()
}

/// Parse a manifest from its JSON form.
pub fn parse_json(source: &str) -> Result<Manifest, ManifestError> {
    let raw: raw::RawManifest =
        serde_json::from_str(source).map_err(|e| ManifestError::Malformed {
            reason: e.to_string(),
        })?;
    raw.into_manifest()
}

/// Read and parse a manifest file; `.json` files use the JSON form, anything
/// else is read as TOML.
pub fn load(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
        path:   path.to_path_buf(),
        source: e,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => parse_json(&source),
        _ => parse(&source),
    }
}
