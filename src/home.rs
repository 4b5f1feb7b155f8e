use std::path::{Path, PathBuf};

use crate::coordinate::Coordinate;
use crate::error::HipoError;

/// The tool-owned root holding `jre/` and `cache/`.
///
/// Only paths are computed here; directories appear when [`ManagedHome::prepare`]
/// or [`ManagedHome::prepare_runtime_dir`] is called, and both are idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedHome {
    root: PathBuf,
}

impl ManagedHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.root.join("jre")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn artifact_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.cache_dir()
            .join(coordinate.relative_dir())
            .join(coordinate.jar_name())
    }

    pub fn prepare(&self) -> Result<(), HipoError> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn prepare_runtime_dir(&self) -> Result<PathBuf, HipoError> {
        let dir = self.runtime_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
