use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{StorageBackend, StorageError, StoredObject};

/// Stores objects under a root directory. URLs point at the `/media` route.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, app_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: format!("{}/media", app_url.trim_end_matches('/')),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!("Invalid storage key '{key}'")));
        }
        Ok(self.root.join(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(key, size = bytes.len(), "Stored object on local disk");

        Ok(StoredObject {
            key: key.to_string(),
            path: path.to_string_lossy().into_owned(),
            url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn url(&self, key: &str, _expires_in: u64) -> Result<String, StorageError> {
        self.resolve(key)?;
        Ok(self.public_url(key))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
