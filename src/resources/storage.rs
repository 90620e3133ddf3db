//! Uploaded file storage
//!
//! Files are written under the configured storage directory with a generated
//! name; the original filename is only kept as metadata. The storage name is
//! never derived from client input.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Filesystem store for resource payloads
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the storage directory if missing
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create storage dir {}", self.root.display()))?;
        Ok(())
    }

    /// Persist an upload; returns the generated storage name
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let storage_name = storage_name_for(original_name);
        let path = self.root.join(&storage_name);

        let mut file = fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.flush().await.context("Failed to flush upload")?;

        Ok(storage_name)
    }

    /// Read a stored file back
    pub async fn read(&self, storage_name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(storage_name);
        fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Remove a stored file; missing files are not an error
    pub async fn remove(&self, storage_name: &str) -> Result<()> {
        let path = self.root.join(storage_name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

/// Generated storage name: random UUID plus the original extension
fn storage_name_for(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    if ext.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        format!("{}.{}", Uuid::new_v4(), ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_name_keeps_extension() {
        let name = storage_name_for("report.pdf");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_storage_name_without_extension() {
        let name = storage_name_for("README");
        assert!(!name.contains('.'));
        assert_eq!(name.len(), 36);
    }

    #[test]
    fn test_storage_names_are_unique() {
        assert_ne!(storage_name_for("a.zip"), storage_name_for("a.zip"));
    }

    #[tokio::test]
    async fn test_save_read_remove_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tradepost-test-{}", Uuid::new_v4()));
        let store = FileStore::new(&dir);
        store.ensure_root().await.unwrap();

        let name = store.save("hello.txt", b"hello world").await.unwrap();
        let data = store.read(&name).await.unwrap();
        assert_eq!(data, b"hello world");

        store.remove(&name).await.unwrap();
        assert!(store.read(&name).await.is_err());
        // Removing again is a no-op
        store.remove(&name).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
