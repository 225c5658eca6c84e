//! Filesystem access to the build output directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tracing::info;

use super::error::InfraError;

#[derive(Clone, Debug)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Read a file below the root, `None` when it does not exist.
    pub async fn read_optional(&self, relative: &str) -> Result<Option<String>, InfraError> {
        let path = self.path(relative);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(InfraError::output(path, err)),
        }
    }

    /// Replace a file below the root, creating parent directories as needed.
    pub async fn write(&self, relative: &str, contents: &str) -> Result<PathBuf, InfraError> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| InfraError::output(parent, err))?;
        }
        fs::write(&path, contents)
            .await
            .map_err(|err| InfraError::output(&path, err))?;

        metrics::counter!("folio_artifacts_written_total").increment(1);
        info!(
            target = "infra::output",
            path = %path.display(),
            bytes = contents.len(),
            "artifact written"
        );
        Ok(path)
    }
}
