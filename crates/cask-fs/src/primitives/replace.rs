use std::path::Path;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug)]
pub struct ReplaceOptions {
    pub retry_count: u32,
    pub retry_delay: std::time::Duration,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            retry_count: 5,
            retry_delay: std::time::Duration::from_millis(100),
        }
    }
}

impl ReplaceOptions {
    pub fn new() -> Self { Self::default() }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn retry_delay(mut self, delay: std::time::Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Rename `src` over `dest` in one step.
///
/// Both paths must live on the same filesystem. On unix the rename is
/// atomic: `dest` always names either the old or the new file.
pub fn replace_file(src: impl AsRef<Path>, dest: impl AsRef<Path>, options: ReplaceOptions) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    #[cfg(unix)]
    {
        let _ = options;
        std::fs::rename(src, dest).map_err(|e| Error::Rename {
            from:   src.to_path_buf(),
            to:     dest.to_path_buf(),
            source: e,
        })
    }

    // A running executable or a scanner may hold the target open for a moment.
    #[cfg(not(unix))]
    {
        let mut attempts = 0;
        loop {
            match std::fs::rename(src, dest) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempts += 1;
                    if attempts >= options.retry_count {
                        return Err(Error::Rename {
                            from:   src.to_path_buf(),
                            to:     dest.to_path_buf(),
                            source: e,
                        });
                    }
                    std::thread::sleep(options.retry_delay * attempts);
                }
            }
        }
    }
}

/// Remove a file, treating an already-missing file as success.
///
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Remove {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(unix)]
pub fn set_executable(path: impl AsRef<Path>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        Error::Write {
            path:   path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
pub fn set_executable(_path: impl AsRef<Path>) -> Result<()> { Ok(()) }
