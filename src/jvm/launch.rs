use std::path::Path;
use std::process::Command;

use crate::config::TargetOs;
use crate::error::HipoError;

/// Runs `java -jar`. Split out so the run flow can be exercised without a JVM.
pub trait Launcher {
    fn launch(&self, java: &Path, jar: &Path, args: &[String]) -> Result<(), HipoError>;
}

/// Spawns the JVM with inherited stdio and blocks until it exits.
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, java: &Path, jar: &Path, args: &[String]) -> Result<(), HipoError> {
        tracing::info!("running {} -jar {}", java.display(), jar.display());

        let status = java_command(java, jar, args)
            .status()
            .map_err(|e| HipoError::Launch(format!("{}: {e}", java.display())))?;

        if !status.success() {
            return Err(HipoError::ChildFailed(status));
        }
        Ok(())
    }
}

pub fn java_command(java: &Path, jar: &Path, args: &[String]) -> Command {
    let mut command = Command::new(java);
    command.arg("-jar").arg(jar).args(args);
    command
}

/// Archives do not always carry the execute bit through, so set it before launching.
pub fn ensure_executable(java: &Path, os: TargetOs) -> Result<(), HipoError> {
    if os == TargetOs::Windows {
        return Ok(());
    }
    set_execute_bits(java)
}

#[cfg(unix)]
fn set_execute_bits(path: &Path) -> Result<(), HipoError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode();
    if mode & 0o111 != 0o111 {
        tracing::debug!("adding execute permission to {}", path.display());
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o755))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_execute_bits(_path: &Path) -> Result<(), HipoError> {
    Ok(())
}
