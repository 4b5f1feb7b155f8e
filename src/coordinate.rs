use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::HipoError;

/// A Maven `group:artifact:version` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    pub fn jar_name(&self) -> String {
        format!("{}-{}.jar", self.artifact, self.version)
    }

    /// Path of the JAR relative to a repository root or the cache root.
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::new();
        for segment in self.group.split('.') {
            dir.push(segment);
        }
        dir.join(&self.artifact).join(&self.version)
    }

    pub fn url(&self, repository: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            repository.trim_end_matches('/'),
            self.group_path(),
            self.artifact,
            self.version,
            self.jar_name()
        )
    }
}

impl FromStr for Coordinate {
    type Err = HipoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if group.split('.').all(is_path_segment)
                    && is_path_segment(artifact)
                    && is_path_segment(version) =>
            {
                Ok(Self {
                    group: group.to_string(),
                    artifact: artifact.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(HipoError::InvalidCoordinate(s.to_string())),
        }
    }
}

// Each part becomes a directory name under the cache, so it must stay one.
fn is_path_segment(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\'])
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}
