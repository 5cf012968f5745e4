//! Local file storage service for uploaded documents.
//!
//! Stored names are opaque handles: a fresh UUID plus the original file
//! extension. The documents table records the handle; nothing outside this
//! service interprets it.

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// File storage rooted at the configured uploads directory.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a new storage service, ensuring the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create uploads directory: {}", e)))?;

        info!("File storage initialized: root={}", root.display());

        Ok(Self { root })
    }

    /// Build the stored name for an uploaded file: UUID plus the original
    /// extension.
    pub fn stored_name(original_filename: &str) -> String {
        match Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) if !ext.is_empty() => format!("{}.{}", Uuid::new_v4(), ext),
            _ => Uuid::new_v4().to_string(),
        }
    }

    /// Save file content and return the opaque stored name.
    pub async fn save(&self, original_filename: &str, data: &[u8]) -> AppResult<String> {
        let stored = Self::stored_name(original_filename);
        let path = self.root.join(&stored);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to save file: {}", e)))?;

        Ok(stored)
    }

    /// Load the content of a stored file.
    pub async fn load(&self, stored_name: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(stored_name)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("Stored file".to_string()))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to read file: {}", e))),
        }
    }

    /// Delete a stored file. Deleting a name that no longer exists is not an
    /// error.
    pub async fn delete(&self, stored_name: &str) -> AppResult<()> {
        if stored_name.is_empty() {
            return Ok(());
        }

        let path = self.resolve(stored_name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {}", e))),
        }
    }

    /// Resolve a stored name to a path under the root, rejecting anything
    /// that could escape it.
    fn resolve(&self, stored_name: &str) -> AppResult<PathBuf> {
        if stored_name.contains("..") || stored_name.contains('/') || stored_name.contains('\\') {
            return Err(AppError::Storage(format!(
                "Invalid stored file name: {}",
                stored_name
            )));
        }

        Ok(self.root.join(stored_name))
    }
}
