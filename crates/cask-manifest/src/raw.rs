//! Serialized manifest shape, shared by the TOML and JSON forms.

use serde::Deserialize;

use crate::{Binary, Integrity, Manifest, ManifestError, UrlTemplate};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawManifest {
    name:        String,
    version:     String,
    integrity:   String,
    #[serde(alias = "url_template")]
    url:         String,
    #[serde(alias = "desc")]
    description: String,
    homepage:    String,
    #[serde(alias = "binary")]
    binaries:    Vec<RawBinary>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBinary {
    Name(String),
    Mapping {
        source: String,
        #[serde(default)]
        target: Option<String>,
    },
}

impl RawManifest {
    pub(crate) fn into_manifest(self) -> Result<Manifest, ManifestError> {
        let url_template = UrlTemplate::parse(&self.url)
            .map_err(|e| ManifestError::malformed(format!("url: {e}")))?;
        if url_template.placeholder_count() == 0 {
            return Err(ManifestError::malformed(
                "url has no `{version}` placeholder",
            ));
        }

        if self.binaries.is_empty() {
            return Err(ManifestError::malformed("binaries must not be empty"));
        }

        let integrity: Integrity = self.integrity.parse()?;

        let binaries = self
            .binaries
            .into_iter()
            .map(|b| match b {
                RawBinary::Name(source) => Binary::new(source, None),
                RawBinary::Mapping { source, target } => Binary::new(source, target),
            })
            .collect();

        Ok(Manifest {
            name: self.name,
            version: self.version,
            description: self.description,
            homepage: self.homepage,
            url_template,
            integrity,
            binaries,
        })
    }
}
