use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{
    error::{AppError, Result},
    storage::ObjectStore,
};

/// Writes objects below `root` and serves them from `{base_url}/uploads/`.
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || key.is_empty() {
            return Err(AppError::BadRequest(format!("Invalid object key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, key: &str, _content_type: &str, data: &[u8]) -> Result<String> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!("Failed to create uploads directory: {}", e))
            })?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to create file: {}", e))
        })?;

        file.write_all(data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file: {}", e))
        })?;

        file.flush().await.map_err(|e| {
            AppError::Internal(format!("Failed to write file: {}", e))
        })?;

        Ok(format!("{}/uploads/{}", self.base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {}", e))),
        }
    }
}
