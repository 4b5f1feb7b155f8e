mod cli;
mod config;
mod coordinate;
mod download;
mod error;
mod extract;
mod home;
mod jvm;
mod maven;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::HumanBytes;

use cli::{Cli, Command};
use config::{ArchTable, HipoConfig, Target};
use coordinate::Coordinate;
use error::HipoError;
use home::ManagedHome;
use jvm::adoptium::Adoptium;
use jvm::launch::ProcessLauncher;
use jvm::{Provisioned, Provisioner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("hipo=info".parse()?),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let config = HipoConfig {
        home: match cli.home {
            Some(home) => home,
            None => HipoConfig::default_home()?,
        },
        adoptium_url: cli.adoptium_url,
        maven_url: cli.maven_url,
        channel: cli.channel,
        timeout: cli.timeout.map(Duration::from_secs),
    };

    match cli.command {
        Command::Run {
            coordinate,
            refresh,
            args,
        } => {
            let coordinate: Coordinate = coordinate.parse()?;
            run_artifact(&config, &coordinate, refresh, &args).await?;
        }
        Command::Install => {
            run_install(&config).await?;
        }
        Command::Info => {
            run_info(&config)?;
        }
    }

    Ok(())
}

fn provisioner(config: &HipoConfig, client: &reqwest::Client) -> Result<Provisioner<Adoptium>> {
    let target = Target::current(&ArchTable::default())?;
    let source = Adoptium::new(client.clone(), config.adoptium_url.clone());
    Ok(Provisioner::new(
        ManagedHome::new(&config.home),
        target,
        config.channel,
        source,
    ))
}

async fn run_install(config: &HipoConfig) -> Result<()> {
    let client = config.http_client()?;
    let provisioner = provisioner(config, &client)?;

    match provisioner
        .ensure_runtime()
        .await
        .context("failed to provision a Java runtime")?
    {
        Provisioned::Existing(java) => eprintln!("Java runtime already installed: {}", java.display()),
        Provisioned::Installed { release } => eprintln!("Installed Java {release} runtime"),
    }
    Ok(())
}

async fn run_artifact(
    config: &HipoConfig,
    coordinate: &Coordinate,
    refresh: bool,
    args: &[String],
) -> Result<()> {
    let client = config.http_client()?;
    let provisioner = provisioner(config, &client)?;
    provisioner
        .ensure_runtime()
        .await
        .context("failed to provision a Java runtime")?;

    let home = ManagedHome::new(&config.home);
    let jar = maven::fetch_artifact(&client, &config.maven_url, &home, coordinate, refresh)
        .await
        .with_context(|| format!("failed to fetch {coordinate} from the maven repository"))?;

    match provisioner.launch(&jar, args, &ProcessLauncher) {
        Err(HipoError::ChildFailed(status)) => {
            tracing::error!("{} exited with {status}", jar.display());
            Ok(())
        }
        other => other.context("error running the Java command"),
    }
}

fn run_info(config: &HipoConfig) -> Result<()> {
    let home = ManagedHome::new(&config.home);
    eprintln!("Managed home:    {}", home.root().display());

    let runtime_dir = home.runtime_dir();
    let runtime = if runtime_dir.is_dir() {
        jvm::locate::find_java(&runtime_dir)?
    } else {
        None
    };
    match runtime {
        Some(java) => eprintln!("Java runtime:    {}", java.display()),
        None => eprintln!("Java runtime:    not installed"),
    }

    match Target::current(&ArchTable::default()) {
        Ok(target) => eprintln!("Target:          {}/{}", target.os.adoptium_os(), target.arch),
        Err(e) => eprintln!("Target:          {e}"),
    }

    let cache_dir = home.cache_dir();
    if cache_dir.exists() {
        let jars = cached_jars(&cache_dir);
        let size: u64 = jars.iter().map(|(_, len)| len).sum();
        eprintln!("Cache size:      {}", HumanBytes(size));
        eprintln!("Cached JARs:     {}", jars.len());
        for (jar, len) in &jars {
            let name = jar.strip_prefix(&cache_dir).unwrap_or(jar);
            eprintln!("  {} ({})", name.display(), HumanBytes(*len));
        }
    } else {
        eprintln!("Cache is empty");
    }
    Ok(())
}

fn cached_jars(dir: &Path) -> Vec<(PathBuf, u64)> {
    let mut jars = Vec::new();
    walk_jars(dir, &mut jars);
    jars.sort();
    jars
}

fn walk_jars(dir: &Path, jars: &mut Vec<(PathBuf, u64)>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                walk_jars(&p, jars);
            } else if p.extension().is_some_and(|e| e == "jar") {
                if let Ok(meta) = p.metadata() {
                    jars.push((p, meta.len()));
                }
            }
        }
    }
}
