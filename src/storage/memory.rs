use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{validate_key, ObjectStore, StorageError};

const URL_PREFIX: &str = "memory://";

/// Process-local store for tests and throwaway servers
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_on: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Bytes,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `put` whose key contains `pattern` fails with a 503 rejection
    pub fn failing_on(pattern: impl Into<String>) -> Self {
        Self {
            objects: RwLock::default(),
            fail_on: Some(pattern.into()),
        }
    }

    pub async fn get(&self, url: &str) -> Option<StoredObject> {
        let key = url.strip_prefix(URL_PREFIX)?;
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<String, StorageError> {
        validate_key(key)?;
        if self.fail_on.as_deref().is_some_and(|pattern| key.contains(pattern)) {
            return Err(StorageError::Rejected {
                status: 503,
                key: key.to_string(),
            });
        }

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("{}{}", URL_PREFIX, key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = url
            .strip_prefix(URL_PREFIX)
            .ok_or_else(|| StorageError::InvalidKey(url.to_string()))?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
