use std::io::{self, Read};

use super::Wanted;
use crate::error::{Error, Result};

pub(super) fn extract<R: Read>(reader: R, wanted: &mut Wanted<'_>) -> Result<()> {
    let mut archive = ::tar::Archive::new(reader);
    for entry in archive.entries().map_err(corrupted)? {
        let mut entry = entry.map_err(corrupted)?;
        let path = entry.path().map_err(corrupted)?.into_owned();
        let Some(slot) = wanted.slot(&path) else {
            continue;
        };

        if !entry.header().entry_type().is_file() {
            return Err(Error::NotAFile {
                entry: wanted.source(slot).to_string(),
            });
        }
        wanted.write(slot, &mut entry)?;

        if wanted.is_complete() {
            break;
        }
    }
    Ok(())
}

fn corrupted(e: io::Error) -> Error { Error::Corrupted(e.to_string()) }
