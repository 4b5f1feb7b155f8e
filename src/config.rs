use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::HipoError;

pub const DEFAULT_ADOPTIUM_URL: &str = "https://api.adoptium.net/v3";
pub const DEFAULT_MAVEN_URL: &str = "https://repo1.maven.org/maven2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Linux,
    MacOs,
    Windows,
}

impl TargetOs {
    pub fn current() -> Result<Self, HipoError> {
        Self::from_host(std::env::consts::OS)
    }

    pub fn from_host(os: &str) -> Result<Self, HipoError> {
        match os {
            "linux" => Ok(TargetOs::Linux),
            "macos" => Ok(TargetOs::MacOs),
            "windows" => Ok(TargetOs::Windows),
            other => Err(HipoError::UnsupportedOs(other.to_string())),
        }
    }

    pub fn adoptium_os(&self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::MacOs => "mac",
            TargetOs::Windows => "windows",
        }
    }
}

/// Host architecture identifier → vendor architecture name.
#[derive(Debug, Clone)]
pub struct ArchTable {
    entries: HashMap<String, String>,
}

impl ArchTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn resolve(&self, host_arch: &str) -> Result<&str, HipoError> {
        self.entries
            .get(host_arch)
            .map(String::as_str)
            .ok_or_else(|| HipoError::UnsupportedArchitecture(host_arch.to_string()))
    }
}

impl Default for ArchTable {
    fn default() -> Self {
        Self::new([("x86_64", "x64"), ("aarch64", "aarch64")])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub os: TargetOs,
    /// Vendor spelling, e.g. `x64`.
    pub arch: String,
}

impl Target {
    pub fn current(table: &ArchTable) -> Result<Self, HipoError> {
        Self::resolve(TargetOs::current()?, std::env::consts::ARCH, table)
    }

    pub fn resolve(os: TargetOs, host_arch: &str, table: &ArchTable) -> Result<Self, HipoError> {
        let arch = table.resolve(host_arch)?.to_string();
        Ok(Self { os, arch })
    }
}

/// Which field of Adoptium's `available_releases` picks the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReleaseChannel {
    /// `most_recent_feature_release`
    #[default]
    Feature,
    /// `most_recent_lts`
    Lts,
}

#[derive(Debug, Clone)]
pub struct HipoConfig {
    pub home: PathBuf,
    pub adoptium_url: String,
    pub maven_url: String,
    pub channel: ReleaseChannel,
    pub timeout: Option<Duration>,
}

impl HipoConfig {
    pub fn default_home() -> Result<PathBuf, HipoError> {
        dirs::home_dir()
            .map(|home| home.join(".hipo"))
            .ok_or(HipoError::NoHomeDirectory)
    }

    pub fn http_client(&self) -> Result<reqwest::Client, HipoError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("hipo/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}
