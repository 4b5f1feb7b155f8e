use std::path::{Component, Path, PathBuf};

use crate::error::HipoError;

/// Resolve an archive entry name against the extraction root.
///
/// The returned path is lexically cleaned and lies strictly below `root`.
/// Absolute names, names that climb out with `..`, and names that collapse
/// to the root itself are rejected as [`HipoError::PathTraversal`].
pub fn guard_entry(root: &Path, entry_name: &str) -> Result<PathBuf, HipoError> {
    let root = clean(root);
    let candidate = clean(&root.join(entry_name));

    if candidate == root || !candidate.starts_with(&root) {
        return Err(HipoError::PathTraversal {
            entry: entry_name.to_string(),
            resolved: candidate,
        });
    }

    Ok(candidate)
}

/// Like [`guard_entry`], for a symlink target interpreted relative to the
/// directory holding the link.
pub fn guard_link_target(root: &Path, link: &Path, target: &Path) -> Result<PathBuf, HipoError> {
    let root = clean(root);
    let base = link.parent().unwrap_or(&root);
    let resolved = clean(&base.join(target));

    if target.is_absolute() || !resolved.starts_with(&root) {
        return Err(HipoError::PathTraversal {
            entry: target.to_string_lossy().into_owned(),
            resolved,
        });
    }

    Ok(resolved)
}

/// Create the missing parent directories of `path` and return the parent
/// with every symlink already on disk resolved.
///
/// `root` must be canonical. Lexical checks alone cannot see links written
/// by earlier entries, so the deepest existing ancestor is canonicalized and
/// must still lie inside `root`.
pub fn contained_parent(root: &Path, path: &Path) -> Result<PathBuf, HipoError> {
    let mut existing = path.parent().unwrap_or(root);
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(up)) => {
                missing.push(name.to_os_string());
                existing = up;
            }
            _ => break,
        }
    }

    let mut real = existing.canonicalize()?;
    if !real.starts_with(root) {
        return Err(HipoError::PathTraversal {
            entry: path.to_string_lossy().into_owned(),
            resolved: real,
        });
    }

    for name in missing.iter().rev() {
        real.push(name);
    }
    std::fs::create_dir_all(&real)?;
    Ok(real)
}

/// Lexical path cleaning: drops `.`, resolves `..` against what precedes it.
/// Never touches the filesystem.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
