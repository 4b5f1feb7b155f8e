use std::path::{Path, PathBuf};

use crate::error::HipoError;

const EXECUTABLE_NAMES: [&str; 2] = ["java", "java.exe"];

/// Find the java executable inside an extracted runtime.
///
/// Looks one directory deep (`<parent>/<vendor>/bin/java`), also accepting the
/// macOS bundle layout `<vendor>/Contents/Home/bin`. Stray files and vendor
/// directories without a `bin` are skipped. `Ok(None)` means nothing is
/// installed; unreadable directories are errors.
pub fn find_java(parent: &Path) -> Result<Option<PathBuf>, HipoError> {
    for runtime in sorted_entries(parent)? {
        if !runtime.is_dir() {
            continue;
        }

        let candidates = [
            runtime.join("bin"),
            runtime.join("Contents").join("Home").join("bin"),
        ];
        for bin in candidates.iter().filter(|bin| bin.is_dir()) {
            let found = sorted_entries(bin)?.into_iter().find(|entry| {
                entry
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| EXECUTABLE_NAMES.contains(&n))
            });
            if let Some(java) = found {
                tracing::debug!("found java at {}", java.display());
                return Ok(Some(java));
            }
        }
    }

    Ok(None)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, HipoError> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}
