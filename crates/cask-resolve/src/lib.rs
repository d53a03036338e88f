//! Turn a manifest and a requested version into a concrete, fetchable
//! artifact reference.
//!
//! Resolution is pure and deterministic: the same manifest and version
//! always yield the same URL.

use std::borrow::Cow;
use std::fmt;

use cask_manifest::Manifest;
use cask_verify::Sha256Digest;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("cannot resolve version `{version}`: {reason}")]
    UnresolvableVersion { version: String, reason: String },
}

impl ResolveError {
    fn unresolvable(version: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvableVersion {
            version: version.escape_debug().to_string(),
            reason:  reason.into(),
        }
    }
}

/// A fully resolved download for one package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub package:       String,
    pub version:       String,
    pub concrete_url:  Url,
    /// `None` when the manifest opted out of verification.
    pub expected_hash: Option<Sha256Digest>,
    /// Last path segment of the URL, the name a bare binary download is known by.
    pub file_name:     String,
}

impl ResolvedArtifact {
    pub fn is_verified(&self) -> bool { self.expected_hash.is_some() }
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.package, self.version, self.concrete_url)
    }
}

/// Resolve `requested_version` against the manifest's URL template.
pub fn resolve(manifest: &Manifest, requested_version: &str) -> Result<ResolvedArtifact, ResolveError> {
    let template = manifest.url_template();
    match template.placeholder_count() {
        0 => {
            return Err(ResolveError::unresolvable(
                requested_version,
                "url template has no `{version}` placeholder",
            ));
        }
        1 => {}
        n => {
            return Err(ResolveError::unresolvable(
                requested_version,
                format!("url template has {n} placeholders, expected one"),
            ));
        }
    }

    let encoded = encode_version(requested_version)?;
    let rendered = template.render(&encoded);
    let concrete_url = Url::parse(&rendered).map_err(|e| {
        ResolveError::unresolvable(requested_version, format!("`{rendered}` is not a valid URL: {e}"))
    })?;
    if !matches!(concrete_url.scheme(), "http" | "https") {
        return Err(ResolveError::unresolvable(
            requested_version,
            format!("unsupported URL scheme `{}`", concrete_url.scheme()),
        ));
    }

    let file_name = file_name(&concrete_url).unwrap_or_else(|| manifest.name().to_string());
    let expected_hash = manifest.integrity().expected().copied();

    if expected_hash.is_none() {
        tracing::warn!(
            package = manifest.name(),
            version = requested_version,
            "integrity is `unchecked`: the download will not be verified"
        );
    }

    tracing::debug!(package = manifest.name(), url = %concrete_url, "resolved artifact");

    Ok(ResolvedArtifact {
        package: manifest.name().to_string(),
        version: requested_version.to_string(),
        concrete_url,
        expected_hash,
        file_name,
    })
}

/// Resolve the version the manifest itself declares.
pub fn resolve_default(manifest: &Manifest) -> Result<ResolvedArtifact, ResolveError> {
    resolve(manifest, manifest.version())
}

/// Percent-encode a version for substitution into a URL path.
///
/// Characters that would change the URL's structure are rejected rather
/// than encoded; everything outside the unreserved set is encoded.
fn encode_version(version: &str) -> Result<Cow<'_, str>, ResolveError> {
    if version.is_empty() {
        return Err(ResolveError::unresolvable(version, "version is empty"));
    }
    if version == "." || version == ".." {
        return Err(ResolveError::unresolvable(version, "version is a relative path component"));
    }
    if let Some(c) = version
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\'))
    {
        return Err(ResolveError::unresolvable(
            version,
            format!("character {c:?} is not allowed in a version"),
        ));
    }
    Ok(urlencoding::encode(version))
}

fn file_name(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment).ok()?;
    Some(decoded.into_owned())
}
