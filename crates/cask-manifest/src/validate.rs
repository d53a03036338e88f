use std::collections::HashSet;

use crate::{Manifest, ManifestError};

/// Check every manifest invariant. Pure: touches neither network nor disk.
pub fn validate(manifest: &Manifest) -> Result<(), ManifestError> {
    validate_name(&manifest.name)?;
    validate_version(&manifest.version)?;

    if manifest.description.trim().is_empty() {
        return Err(ManifestError::validation("description must not be empty"));
    }
    validate_http_url("homepage", &manifest.homepage)?;

    let placeholders = manifest.url_template.placeholder_count();
    if placeholders != 1 {
        return Err(ManifestError::validation(format!(
            "url must contain exactly one `{{version}}` placeholder, found {placeholders}"
        )));
    }
    validate_http_url("url", &manifest.url_template.render(&manifest.version))?;

    if manifest.binaries.is_empty() {
        return Err(ManifestError::validation("binaries must not be empty"));
    }

    let mut targets = HashSet::new();
    for binary in &manifest.binaries {
        validate_source(binary.source())?;
        validate_target(binary.target())?;
        if !targets.insert(binary.target()) {
            return Err(ManifestError::validation(format!(
                "binary target `{}` is listed more than once",
                binary.target()
            )));
        }
    }

    Ok(())
}

fn validate_name(name: &str) -> Result<(), ManifestError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ManifestError::validation("name must not be empty"));
    };
    if !first.is_ascii_alphanumeric()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | '+'))
    {
        return Err(ManifestError::validation(format!(
            "name `{name}` must start with a letter or digit and contain only letters, digits, `-`, `_`, `.`, `@` or `+`"
        )));
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<(), ManifestError> {
    if version.is_empty() {
        return Err(ManifestError::validation("version must not be empty"));
    }
    if version.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ManifestError::validation(format!(
            "version `{}` contains whitespace or control characters",
            version.escape_debug()
        )));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ManifestError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ManifestError::validation(format!("{field} `{value}` is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ManifestError::validation(format!(
            "{field} must use http or https, got `{scheme}`"
        ))),
    }
}

fn validate_source(source: &str) -> Result<(), ManifestError> {
    let invalid = |why: &str| {
        ManifestError::validation(format!("binary source `{source}` {why}"))
    };

    if source.is_empty() {
        return Err(invalid("is empty"));
    }
    if source.starts_with('/') || source.contains('\\') || source.contains(':') {
        return Err(invalid("must be a relative path using `/` separators"));
    }
    let path = source.strip_prefix("./").unwrap_or(source);
    if path.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return Err(invalid("must not contain empty, `.` or `..` components"));
    }
    Ok(())
}

fn validate_target(target: &str) -> Result<(), ManifestError> {
    if target.is_empty()
        || target == "."
        || target == ".."
        || target.contains(['/', '\\', ':'])
        || target.chars().any(char::is_control)
    {
        return Err(ManifestError::validation(format!(
            "binary target `{target}` must be a plain file name"
        )));
    }
    Ok(())
}
