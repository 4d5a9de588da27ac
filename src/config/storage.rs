use crate::core::Storage;
use crate::utils::error::{Result, SelectError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Filesystem storage rooted at `base_path`. Absolute paths bypass the root.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        tracing::debug!("Reading {}", full_path.display());

        fs::read(&full_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SelectError::SourceError {
                path: full_path.display().to_string(),
                reason: "not found".to_string(),
            },
            ErrorKind::PermissionDenied => SelectError::SourceError {
                path: full_path.display().to_string(),
                reason: "is unreadable: permission denied".to_string(),
            },
            _ => SelectError::IoError(e),
        })
    }
}
