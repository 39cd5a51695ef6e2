//! Local filesystem storage implementation.
//!
//! Every write goes to a sibling `*.tmp` file first and is renamed over the
//! target, so a crash mid-write leaves the previous content in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Store;
use crate::storage::DigestStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = temp_path(&path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// `docs/store.json` → `docs/store.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl DigestStorage for LocalStorage {
    async fn load_store(&self, key: &str) -> Result<Store> {
        let Some(bytes) = self.read_bytes(key).await? else {
            log::info!("No store at {}, starting empty", key);
            return Ok(Store::new());
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            log::info!("Store {} is empty, starting empty", key);
            return Ok(Store::new());
        }

        let store: Store = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::corrupt_store(&self.path(key), e))?;
        log::info!(
            "Loaded {} entries in {} topics from {}",
            store.entry_count(),
            store.topic_count(),
            key
        );
        Ok(store)
    }

    async fn save_store(&self, key: &str, store: &Store) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(store)?;
        self.write_bytes(key, &bytes).await?;
        log::info!(
            "Saved {} entries in {} topics to {}",
            store.entry_count(),
            store.topic_count(),
            key
        );
        Ok(())
    }

    async fn write_document(&self, key: &str, content: &str) -> Result<()> {
        self.write_bytes(key, content.as_bytes()).await?;
        log::info!("Wrote document {}", key);
        Ok(())
    }
}
