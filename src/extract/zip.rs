use std::fs::OpenOptions;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::HipoError;

use super::guard::guard_entry;
use super::{apply_mode, create_parent};

const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extract a zip archive into `root`.
///
/// Zip needs random access to its central directory, so the reader must be
/// seekable. Entries are still materialized one at a time.
pub fn extract_zip<R: Read + Seek>(reader: R, root: &Path) -> Result<(), HipoError> {
    let mut archive = zip::ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let out_path = guard_entry(root, &name)?;

        if entry.is_dir() {
            tracing::debug!("mkdir {}", out_path.display());
            std::fs::create_dir_all(&out_path)?;
            continue;
        }

        create_parent(&out_path)?;

        let mode = entry.unix_mode().unwrap_or(DEFAULT_FILE_MODE);
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode & 0o7777);
        }

        let mut out_file = options.open(&out_path)?;
        std::io::copy(&mut entry, &mut out_file).map_err(HipoError::from_archive_io)?;
        drop(out_file);
        drop(entry);

        apply_mode(&out_path, mode)?;
        tracing::debug!("wrote {} ({:o})", out_path.display(), mode & 0o7777);
    }

    Ok(())
}
