pub mod adoptium;
pub mod launch;
pub mod locate;

use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};

use crate::config::{ReleaseChannel, Target};
use crate::error::HipoError;
use crate::extract::{self, ArchiveKind};
use crate::home::ManagedHome;

use launch::Launcher;

/// Where runtime distributions come from.
// Futures are polled on the current-thread runtime, so they need not be Send.
#[allow(async_fn_in_trait)]
pub trait RuntimeSource {
    async fn latest_release(&self, channel: ReleaseChannel) -> Result<u32, HipoError>;

    /// Write the distribution archive for `target` into `sink`: a zip on
    /// Windows, a gzipped tarball elsewhere.
    async fn fetch_runtime(
        &self,
        release: u32,
        target: &Target,
        sink: &mut File,
    ) -> Result<(), HipoError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    Absent,
    Downloading,
    Extracting,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    Existing(PathBuf),
    Installed { release: u32 },
}

pub struct Provisioner<S> {
    home: ManagedHome,
    target: Target,
    channel: ReleaseChannel,
    source: S,
}

impl<S: RuntimeSource> Provisioner<S> {
    pub fn new(home: ManagedHome, target: Target, channel: ReleaseChannel, source: S) -> Self {
        Self {
            home,
            target,
            channel,
            source,
        }
    }

    /// The java executable of the current installation, if it has one.
    pub fn installed_runtime(&self) -> Result<Option<PathBuf>, HipoError> {
        let dir = self.home.runtime_dir();
        if !dir.is_dir() {
            return Ok(None);
        }
        locate::find_java(&dir)
    }

    /// Install a runtime unless one is already present.
    ///
    /// The extracted layout is not checked again here; [`Provisioner::launch`]
    /// locates the executable when it is actually needed.
    pub async fn ensure_runtime(&self) -> Result<Provisioned, HipoError> {
        if let Some(java) = self.installed_runtime()? {
            tracing::info!("using installed runtime at {}", java.display());
            return Ok(Provisioned::Existing(java));
        }
        let mut state = ProvisionState::Absent;
        tracing::info!(?state, "no Java runtime under {}", self.home.runtime_dir().display());

        self.home.prepare()?;
        let release = self.source.latest_release(self.channel).await?;

        state = advance(state, ProvisionState::Downloading);
        tracing::info!(
            "downloading Java {release} for {}/{}",
            self.target.os.adoptium_os(),
            self.target.arch
        );
        let mut archive = tempfile::tempfile_in(self.home.root())?;
        self.source
            .fetch_runtime(release, &self.target, &mut archive)
            .await?;
        archive.rewind()?;

        state = advance(state, ProvisionState::Extracting);
        self.install(archive)?;

        advance(state, ProvisionState::Ready);
        Ok(Provisioned::Installed { release })
    }

    /// Locate the installed runtime and run `java -jar <jar> <args>` through `launcher`.
    pub fn launch(&self, jar: &Path, args: &[String], launcher: &impl Launcher) -> Result<(), HipoError> {
        let java = self
            .installed_runtime()?
            .ok_or_else(|| HipoError::RuntimeNotFound(self.home.runtime_dir()))?;
        launch::ensure_executable(&java, self.target.os)?;
        launcher.launch(&java, jar, args)
    }

    // Extract into a staging directory next to `jre/` and move the result in
    // only once every entry has been written.
    fn install(&self, archive: File) -> Result<(), HipoError> {
        let runtime_dir = self.home.prepare_runtime_dir()?;
        let staging = tempfile::Builder::new()
            .prefix(".jre-staging-")
            .tempdir_in(self.home.root())?;

        extract::extract(ArchiveKind::for_os(self.target.os), archive, staging.path())?;

        clear_dir(&runtime_dir)?;
        for entry in std::fs::read_dir(staging.path())? {
            let entry = entry?;
            std::fs::rename(entry.path(), runtime_dir.join(entry.file_name()))?;
        }
        Ok(())
    }
}

fn advance(from: ProvisionState, to: ProvisionState) -> ProvisionState {
    tracing::info!("runtime state {from:?} -> {to:?}");
    to
}

// `jre/` held no usable runtime, so whatever is left there is debris from an
// earlier failed attempt.
fn clear_dir(dir: &Path) -> Result<(), HipoError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !path.is_symlink() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}
