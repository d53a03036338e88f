use std::path::{Component, Path};

/// Normalize an archive entry path to `a/b/c` form.
///
/// `.` components are dropped. Returns `None` for empty paths and for
/// anything that is absolute or climbs with `..`; such entries can never
/// match a wanted source and are skipped.
pub fn normalize_entry_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entry_path() {
        assert_eq!(normalize_entry_path(Path::new("bin/tool")).as_deref(), Some("bin/tool"));
        assert_eq!(normalize_entry_path(Path::new("./bin/./tool")).as_deref(), Some("bin/tool"));
        assert_eq!(normalize_entry_path(Path::new("tool")).as_deref(), Some("tool"));
    }

    #[test]
    fn test_normalize_rejects_escapes() {
        assert_eq!(normalize_entry_path(Path::new("../etc/passwd")), None);
        assert_eq!(normalize_entry_path(Path::new("bin/../../x")), None);
        assert_eq!(normalize_entry_path(Path::new("/usr/bin/tool")), None);
        assert_eq!(normalize_entry_path(Path::new("./")), None);
    }
}
