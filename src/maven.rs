use std::path::PathBuf;

use crate::coordinate::Coordinate;
use crate::download;
use crate::error::HipoError;
use crate::home::ManagedHome;

/// Return the cached JAR for `coordinate`, downloading it first if it is
/// missing or `refresh` is set.
pub async fn fetch_artifact(
    client: &reqwest::Client,
    repository: &str,
    home: &ManagedHome,
    coordinate: &Coordinate,
    refresh: bool,
) -> Result<PathBuf, HipoError> {
    let dest = home.artifact_path(coordinate);
    if dest.is_file() && !refresh {
        tracing::info!("using cached {}", dest.display());
        return Ok(dest);
    }

    let url = coordinate.url(repository);
    tracing::info!("fetching {coordinate} from {url}");
    download::fetch_to_file(client, &url, &dest, &coordinate.jar_name()).await?;
    Ok(dest)
}
