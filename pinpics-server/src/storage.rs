//! Object storage for uploaded post images.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A file accepted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Key used to delete the object later
    pub key: String,
    /// Public URL clients load the image from
    pub location: String,
}

/// Bucket-style storage for post images
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store files in the given order, returning one object per file
    ///
    /// Nothing is kept when any file fails.
    async fn upload(&self, files: Vec<(String, Vec<u8>)>) -> StorageResult<Vec<StoredObject>>;

    /// Remove objects by key; keys that are already gone are ignored
    async fn delete(&self, keys: &[String]) -> StorageResult<()>;
}

/// Keep only filename characters that are safe in a URL path segment
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory-backed bucket served by the API under `/files`
pub struct LocalBucket {
    root: PathBuf,
    public_url: String,
}

impl LocalBucket {
    /// `root` is the bucket directory; it is created if missing
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    async fn write_object(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let path = self.object_path(key)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("{}/files/{}", self.public_url, key)
    }
}

#[async_trait]
impl ObjectStore for LocalBucket {
    async fn upload(&self, files: Vec<(String, Vec<u8>)>) -> StorageResult<Vec<StoredObject>> {
        let mut stored: Vec<StoredObject> = Vec::with_capacity(files.len());
        for (filename, bytes) in files {
            let key = format!("{}-{}", Uuid::new_v4().simple(), sanitize_filename(&filename));
            if let Err(e) = self.write_object(&key, bytes).await {
                // All or nothing: drop what this call already wrote
                let written: Vec<String> = stored.into_iter().map(|object| object.key).collect();
                if let Err(cleanup) = self.delete(&written).await {
                    tracing::warn!("Failed to remove partial upload: {}", cleanup);
                }
                return Err(e);
            }
            tracing::debug!("Stored object {}", key);
            stored.push(StoredObject {
                location: self.location(&key),
                key,
            });
        }
        Ok(stored)
    }

    async fn delete(&self, keys: &[String]) -> StorageResult<()> {
        for key in keys {
            let path = self.object_path(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Deleted object {}", key),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("sunset.png"), "sunset.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename(".."), "image");
    }

    #[tokio::test]
    async fn test_upload_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = LocalBucket::new(dir.path().join("pinpictures"), "http://localhost:3000/").unwrap();

        let stored = bucket
            .upload(vec![
                ("a.png".to_string(), vec![1, 2, 3]),
                ("b.png".to_string(), vec![4]),
            ])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored[0].key.ends_with("-a.png"));
        assert_eq!(
            stored[0].location,
            format!("http://localhost:3000/files/{}", stored[0].key)
        );
        let on_disk = std::fs::read(bucket.root().join(&stored[0].key)).unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);

        let keys: Vec<String> = stored.iter().map(|o| o.key.clone()).collect();
        bucket.delete(&keys).await.unwrap();
        assert!(!bucket.root().join(&keys[0]).exists());

        // Deleting again is not an error
        bucket.delete(&keys).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = LocalBucket::new(dir.path().join("pinpictures"), "http://localhost").unwrap();

        // The second name is longer than any filesystem allows
        let too_long = format!("{}.png", "x".repeat(300));
        let result = bucket
            .upload(vec![
                ("a.png".to_string(), vec![1, 2, 3]),
                (too_long, vec![4]),
            ])
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(std::fs::read_dir(bucket.root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = LocalBucket::new(dir.path(), "http://localhost").unwrap();
        let result = bucket.delete(&["../outside".to_string()]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
