use std::io::{Read, Seek};

use super::Wanted;
use crate::error::{Error, Result};

pub(super) fn extract<R: Read + Seek>(reader: R, wanted: &mut Wanted<'_>) -> Result<()> {
    let mut archive = ::zip::ZipArchive::new(reader).map_err(corrupted)?;
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(corrupted)?;
        // Entries escaping the archive root have no enclosed name.
        let Some(path) = file.enclosed_name() else {
            continue;
        };
        let Some(slot) = wanted.slot(&path) else {
            continue;
        };

        if file.is_dir() {
            return Err(Error::NotAFile {
                entry: wanted.source(slot).to_string(),
            });
        }
        wanted.write(slot, &mut file)?;

        if wanted.is_complete() {
            break;
        }
    }
    Ok(())
}

fn corrupted(e: ::zip::result::ZipError) -> Error { Error::Corrupted(e.to_string()) }
