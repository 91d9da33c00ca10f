use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::storage::traits::{CollectionPath, StoreError};

/// Name of the directory created under the platform data directory
const DEFAULT_DIRECTORY_NAME: &str = "Care Tracker";

/// FileConnection resolves collection paths to files under a base directory
#[derive(Debug, Clone)]
pub struct FileConnection {
    base_directory: PathBuf,
}

impl FileConnection {
    /// Create a new connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self, StoreError> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory {}", base_path.display());
        }
        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Platform data directory (`~/.local/share/Care Tracker` on Linux)
    pub fn default_directory() -> Result<PathBuf, StoreError> {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join(DEFAULT_DIRECTORY_NAME))
            .ok_or_else(|| {
                StoreError::Unavailable("could not determine a data directory".to_string())
            })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// File backing a collection: `{base}/users/{uid}/{collection}.yaml`
    pub fn collection_file(&self, collection: &CollectionPath) -> PathBuf {
        let mut path = self.base_directory.clone();
        let segments = collection.segments();
        if let Some((last, parents)) = segments.split_last() {
            for segment in parents {
                path.push(segment);
            }
            path.push(format!("{last}.yaml"));
        }
        path
    }

    /// Ensure the directory holding a collection file exists
    pub async fn ensure_collection_directory(
        &self,
        collection: &CollectionPath,
    ) -> Result<PathBuf, StoreError> {
        let file = self.collection_file(collection);
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(file)
    }
}
