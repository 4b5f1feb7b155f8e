//! Archive extraction for downloaded runtime distributions.
//!
//! Both formats share one contract: every entry name passes through
//! [`guard::guard_entry`] before anything touches the disk, the first bad
//! entry aborts the whole extraction, and nothing already written is rolled
//! back.

pub mod guard;
pub mod tar;
pub mod zip;

use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::config::TargetOs;
use crate::error::HipoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Adoptium ships zip bundles for Windows and gzipped tarballs elsewhere.
    pub fn for_os(os: TargetOs) -> Self {
        match os {
            TargetOs::Windows => ArchiveKind::Zip,
            TargetOs::Linux | TargetOs::MacOs => ArchiveKind::TarGz,
        }
    }
}

pub fn extract<R: Read + Seek>(kind: ArchiveKind, archive: R, root: &Path) -> Result<(), HipoError> {
    tracing::debug!("extracting {:?} archive into {}", kind, root.display());
    match kind {
        ArchiveKind::Zip => zip::extract_zip(archive, root),
        ArchiveKind::TarGz => tar::extract_tar_gz(BufReader::new(archive), root),
    }
}

/// Set the permission bits recorded in the archive, ignoring the umask.
#[cfg(unix)]
pub(crate) fn apply_mode(path: &Path, mode: u32) -> Result<(), HipoError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o7777))?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn apply_mode(_path: &Path, _mode: u32) -> Result<(), HipoError> {
    Ok(())
}

pub(crate) fn create_parent(path: &Path) -> Result<(), HipoError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
