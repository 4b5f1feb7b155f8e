use std::io::Write;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;

use crate::error::HipoError;

/// GET `url` and write the body into `sink` chunk by chunk as it arrives.
/// Returns the number of bytes written.
pub async fn fetch_into<W: Write>(
    client: &reqwest::Client,
    url: &str,
    sink: &mut W,
    label: &str,
) -> Result<u64, HipoError> {
    tracing::debug!("GET {url}");
    let mut response = client.get(url).send().await?;
    check_status(url, response.status())?;

    let pb = progress_bar(response.content_length(), label);
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await? {
        sink.write_all(&chunk)?;
        written += chunk.len() as u64;
        pb.inc(chunk.len() as u64);
    }
    sink.flush()?;
    pb.finish_and_clear();

    tracing::debug!("received {written} bytes from {url}");
    Ok(written)
}

/// GET `url` into `dest`. The body lands in a sibling temp file first, so a
/// failed transfer never leaves a truncated file at `dest`.
pub async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    label: &str,
) -> Result<(), HipoError> {
    let dir = dest
        .parent()
        .ok_or_else(|| HipoError::Io(std::io::Error::other("destination has no parent")))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    fetch_into(client, url, tmp.as_file_mut(), label).await?;
    tmp.persist(dest).map_err(|e| HipoError::Io(e.error))?;
    Ok(())
}

pub fn check_status(url: &str, status: StatusCode) -> Result<(), HipoError> {
    if status != StatusCode::OK {
        return Err(HipoError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

fn progress_bar(total: Option<u64>, label: &str) -> ProgressBar {
    let pb = match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };
    pb.set_message(format!("Downloading {label}"));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_is_accepted() {
        assert!(check_status("https://x", StatusCode::OK).is_ok());

        for status in [StatusCode::NOT_FOUND, StatusCode::NO_CONTENT, StatusCode::BAD_GATEWAY] {
            let err = check_status("https://x", status).unwrap_err();
            assert!(
                matches!(err, HipoError::HttpStatus { status: s, .. } if s == status.as_u16()),
                "{status}"
            );
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let client = reqwest::Client::new();
        let mut body = Vec::new();
        let err = fetch_into(&client, "http://127.0.0.1:9/nothing", &mut body, "test")
            .await
            .unwrap_err();
        assert!(matches!(err, HipoError::Transport(_)), "{err:?}");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cache/app-1.0.jar");
        let client = reqwest::Client::new();

        let result = fetch_to_file(&client, "http://127.0.0.1:9/app.jar", &dest, "app").await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }
}
