use async_trait::async_trait;
use axum::body::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{validate_key, ObjectStore, StorageError};

/// Files under a directory on local disk, served by the app itself
pub struct LocalObjectStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Result<&'a str, StorageError> {
        let key = url
            .strip_prefix(self.url_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidKey(url.to_string()))?;
        validate_key(key)?;
        Ok(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, _content_type: &str, bytes: Bytes) -> Result<String, StorageError> {
        validate_key(key)?;
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored object on disk");
        Ok(format!("{}/{}", self.url_prefix, key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = self.key_from_url(url)?;
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        // each upload has its own directory; only succeeds once it is empty
        if let Some(dir) = path.parent().filter(|dir| *dir != self.root) {
            let _ = tokio::fs::remove_dir(dir).await;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("storefront-local-store-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn writes_and_removes_files() {
        let root = scratch_dir("roundtrip");
        let store = LocalObjectStore::new(&root, "/uploads/");

        let url = store
            .put("rent-easy/shops/abc-tent.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert_eq!(url, "/uploads/rent-easy/shops/abc-tent.png");
        assert_eq!(std::fs::read(root.join("rent-easy/shops/abc-tent.png")).unwrap(), b"png");

        store.delete(&url).await.unwrap();
        assert!(!root.join("rent-easy/shops/abc-tent.png").exists());
        // already gone
        store.delete(&url).await.unwrap();

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn empty_upload_directories_are_cleaned_up() {
        let root = scratch_dir("cleanup");
        let store = LocalObjectStore::new(&root, "/uploads");

        let a = store.put("rent-easy/shops/u1/aa-a.png", "image/png", Bytes::from_static(b"a")).await.unwrap();
        let b = store.put("rent-easy/shops/u1/bb-b.png", "image/png", Bytes::from_static(b"b")).await.unwrap();

        store.delete(&a).await.unwrap();
        assert!(root.join("rent-easy/shops/u1/bb-b.png").exists());
        store.delete(&b).await.unwrap();
        assert!(!root.join("rent-easy/shops/u1").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn refuses_foreign_urls() {
        let store = LocalObjectStore::new(scratch_dir("foreign"), "/uploads");
        assert!(matches!(
            store.delete("https://cdn.example.com/a.png").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.delete("/uploads/../secrets").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
