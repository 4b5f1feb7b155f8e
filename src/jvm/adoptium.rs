use std::fs::File;

use serde::Deserialize;

use crate::config::{ReleaseChannel, Target};
use crate::download;
use crate::error::HipoError;

use super::RuntimeSource;

/// Subset of `GET /v3/info/available_releases`.
#[derive(Debug, Deserialize)]
pub struct AvailableReleases {
    #[serde(default)]
    pub available_lts_releases: Vec<u32>,
    #[serde(default)]
    pub available_releases: Vec<u32>,
    pub most_recent_feature_release: u32,
    pub most_recent_lts: u32,
}

impl AvailableReleases {
    pub fn select(&self, channel: ReleaseChannel) -> Result<u32, HipoError> {
        let release = match channel {
            ReleaseChannel::Feature => self.most_recent_feature_release,
            ReleaseChannel::Lts => self.most_recent_lts,
        };
        if release == 0 {
            return Err(HipoError::ReleaseMetadata(format!(
                "no {channel:?} release advertised"
            )));
        }
        Ok(release)
    }
}

pub fn releases_url(base: &str) -> String {
    format!("{}/info/available_releases", base.trim_end_matches('/'))
}

pub fn binary_url(base: &str, release: u32, target: &Target) -> String {
    format!(
        "{}/binary/latest/{release}/ga/{}/{}/jre/hotspot/normal/eclipse?project=jdk",
        base.trim_end_matches('/'),
        target.os.adoptium_os(),
        target.arch,
    )
}

/// Eclipse Temurin builds served by the Adoptium API.
pub struct Adoptium {
    client: reqwest::Client,
    base_url: String,
}

impl Adoptium {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl RuntimeSource for Adoptium {
    async fn latest_release(&self, channel: ReleaseChannel) -> Result<u32, HipoError> {
        let url = releases_url(&self.base_url);
        tracing::debug!("fetching Adoptium release info: {url}");

        let response = self.client.get(&url).send().await?;
        download::check_status(&url, response.status())?;
        let releases: AvailableReleases = response
            .json()
            .await
            .map_err(|e| HipoError::ReleaseMetadata(format!("failed to parse {url}: {e}")))?;

        tracing::debug!(
            available = ?releases.available_releases,
            lts = ?releases.available_lts_releases,
            "release channels"
        );
        releases.select(channel)
    }

    async fn fetch_runtime(
        &self,
        release: u32,
        target: &Target,
        sink: &mut File,
    ) -> Result<(), HipoError> {
        let url = binary_url(&self.base_url, release, target);
        download::fetch_into(&self.client, &url, sink, &format!("Java {release} runtime")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArchTable, TargetOs};

    const SAMPLE: &str = r#"{
        "available_lts_releases": [8, 11, 17, 21],
        "available_releases": [8, 11, 17, 21, 22],
        "most_recent_feature_release": 22,
        "most_recent_feature_version": 23,
        "most_recent_lts": 21,
        "tip_version": 23
    }"#;

    #[test]
    fn feature_channel_picks_most_recent_feature_release() {
        let releases: AvailableReleases = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(releases.select(ReleaseChannel::Feature).unwrap(), 22);
        assert_eq!(releases.select(ReleaseChannel::Lts).unwrap(), 21);
        assert_eq!(releases.available_lts_releases, [8, 11, 17, 21]);
    }

    #[test]
    fn zero_release_is_rejected() {
        let releases: AvailableReleases = serde_json::from_str(
            r#"{"most_recent_feature_release": 0, "most_recent_lts": 0}"#,
        )
        .unwrap();
        assert!(matches!(
            releases.select(ReleaseChannel::Feature),
            Err(HipoError::ReleaseMetadata(_))
        ));
    }

    #[test]
    fn binary_url_is_platform_specific() {
        let table = ArchTable::default();
        let linux = Target::resolve(TargetOs::Linux, "x86_64", &table).unwrap();
        let mac = Target::resolve(TargetOs::MacOs, "aarch64", &table).unwrap();

        assert_eq!(
            binary_url("https://api.adoptium.net/v3", 21, &linux),
            "https://api.adoptium.net/v3/binary/latest/21/ga/linux/x64/jre/hotspot/normal/eclipse?project=jdk"
        );
        assert_eq!(
            binary_url("https://api.adoptium.net/v3/", 17, &mac),
            "https://api.adoptium.net/v3/binary/latest/17/ga/mac/aarch64/jre/hotspot/normal/eclipse?project=jdk"
        );
    }

    #[test]
    fn releases_endpoint() {
        assert_eq!(
            releases_url("https://api.adoptium.net/v3"),
            "https://api.adoptium.net/v3/info/available_releases"
        );
    }
}
