use std::fmt;
use std::str::FromStr;

use cask_verify::Sha256Digest;

use crate::{ManifestError, UrlTemplate};

/// How a downloaded artifact is checked before it is installed.
///
/// There is no default: skipping the check must be spelled out as
/// `unchecked` in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    Sha256(Sha256Digest),
    Unchecked,
}

impl Integrity {
    pub fn expected(&self) -> Option<&Sha256Digest> {
        match self {
            Self::Sha256(digest) => Some(digest),
            Self::Unchecked => None,
        }
    }

    pub fn is_checked(&self) -> bool { matches!(self, Self::Sha256(_)) }
}

impl FromStr for Integrity {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "unchecked" || s == "no_check" {
            return Ok(Self::Unchecked);
        }
        let hex = s.strip_prefix("sha256:").unwrap_or(s);
        hex.parse().map(Self::Sha256).map_err(|e| {
            ManifestError::malformed(format!(
                "integrity must be `unchecked` or `sha256:<hex>`, got `{s}`: {e}"
            ))
        })
    }
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256(digest) => write!(f, "sha256:{digest}"),
            Self::Unchecked => f.write_str("unchecked"),
        }
    }
}

/// One installed file: a path inside the artifact and the name it gets in
/// the binary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    source: String,
    target: String,
}

impl Binary {
    pub fn new(source: impl Into<String>, target: Option<String>) -> Self {
        let source = source.into();
        let target = target.unwrap_or_else(|| {
            source
                .rsplit('/')
                .find(|c| !c.is_empty())
                .unwrap_or(source.as_str())
                .to_string()
        });
        Self { source, target }
    }

    pub fn source(&self) -> &str { &self.source }

    pub fn target(&self) -> &str { &self.target }
}

/// A parsed package manifest. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub(crate) name:         String,
    pub(crate) version:      String,
    pub(crate) description:  String,
    pub(crate) homepage:     String,
    pub(crate) url_template: UrlTemplate,
    pub(crate) integrity:    Integrity,
    pub(crate) binaries:     Vec<Binary>,
}

impl Manifest {
    pub fn name(&self) -> &str { &self.name }

    pub fn version(&self) -> &str { &self.version }

    pub fn description(&self) -> &str { &self.description }

    pub fn homepage(&self) -> &str { &self.homepage }

    pub fn url_template(&self) -> &UrlTemplate { &self.url_template }

    pub fn integrity(&self) -> &Integrity { &self.integrity }

    pub fn binaries(&self) -> &[Binary] { &self.binaries }

    pub fn validate(&self) -> Result<(), ManifestError> { crate::validate(self) }
}
