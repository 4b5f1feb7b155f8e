use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ReleaseChannel, DEFAULT_ADOPTIUM_URL, DEFAULT_MAVEN_URL};

#[derive(Debug, Parser)]
#[command(name = "hipo", version, about = "Run Maven-hosted JARs on a self-provisioned Java runtime")]
pub struct Cli {
    /// Managed home directory [default: ~/.hipo]
    #[arg(long, global = true, env = "HIPO_HOME")]
    pub home: Option<PathBuf>,

    /// Adoptium API base URL
    #[arg(long, global = true, env = "HIPO_ADOPTIUM_URL", default_value = DEFAULT_ADOPTIUM_URL)]
    pub adoptium_url: String,

    /// Maven repository base URL
    #[arg(long, global = true, env = "HIPO_MAVEN_URL", default_value = DEFAULT_MAVEN_URL)]
    pub maven_url: String,

    /// Which Java release to install when none is present
    #[arg(long, global = true, value_enum, default_value_t = ReleaseChannel::Feature)]
    pub channel: ReleaseChannel,

    /// HTTP timeout in seconds (none by default)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch group:artifact:version from Maven and run it with `java -jar`
    Run {
        /// Artifact coordinate, e.g. com.example:app:1.0.0
        coordinate: String,

        /// Download the JAR again even if it is cached
        #[arg(long)]
        refresh: bool,

        /// Arguments passed to the application
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Install the Java runtime if it is not present yet
    Install,
    /// Show the managed home, installed runtime and cache contents
    Info,
}
