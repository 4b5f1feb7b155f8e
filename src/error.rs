use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum HipoError {
    #[error("{entry}: illegal file path, resolves to {resolved} outside the extraction root")]
    PathTraversal { entry: String, resolved: PathBuf },

    #[error("malformed archive: {0}")]
    ArchiveFormat(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("no java executable found under {0}")]
    RuntimeNotFound(PathBuf),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("invalid coordinate '{0}'. Use <group:artifact:version>")]
    InvalidCoordinate(String),

    #[error("cannot determine the user's home directory")]
    NoHomeDirectory,

    #[error("release metadata unavailable: {0}")]
    ReleaseMetadata(String),

    #[error("failed to launch {0}")]
    Launch(String),

    #[error("java process exited with {0}")]
    ChildFailed(ExitStatus),
}

impl HipoError {
    /// Classify an I/O error raised while reading an archive stream.
    ///
    /// Decoders report corrupt framing as `InvalidData`/`InvalidInput` and a
    /// truncated body as `UnexpectedEof`; anything else is a plain I/O failure.
    pub fn from_archive_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof => HipoError::ArchiveFormat(err.to_string()),
            _ => HipoError::Io(err),
        }
    }
}

impl From<zip::result::ZipError> for HipoError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => HipoError::Io(e),
            other => HipoError::ArchiveFormat(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for HipoError {
    fn from(err: reqwest::Error) -> Self {
        HipoError::Transport(err.to_string())
    }
}
