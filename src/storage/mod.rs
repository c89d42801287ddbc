//! Object storage for shop images.
//!
//! Handlers never talk to a backend directly; they hold an
//! `Arc<dyn ObjectStore>` built from [`StorageConfig`] at startup.

use async_trait::async_trait;
use axum::body::Bytes;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{Flavor, StorageBackend, StorageConfig};

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpObjectStore;
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

/// URL prefix the local backend's files are served under
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store rejected {key} with status {status}")]
    Rejected { status: u16, key: String },

    #[error("Object store is not configured: {0}")]
    NotConfigured(&'static str),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL clients fetch it from
    async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<String, StorageError>;

    /// Remove an object previously returned by `put`, addressed by its public URL.
    /// Removing an object that no longer exists is not an error.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;

    fn name(&self) -> &'static str;
}

/// `<flavor>/shops/<upload id>/<sha256 prefix>-<sanitised file name>`
///
/// Every upload gets its own id, so two shops sending the same picture never
/// share an object and deleting one cannot remove the other's image.
pub fn object_key(flavor: Flavor, file_name: &str, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}/shops/{}/{}-{}",
        flavor.slug(),
        Uuid::new_v4().simple(),
        &hex[..16],
        sanitize_file_name(file_name)
    )
}

fn sanitize_file_name(name: &str) -> String {
    // Browsers on Windows send full paths
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        if c == '.' {
            if out.ends_with('-') {
                out.pop();
            }
            out.push(c);
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '-' || c == '.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.chars().take(80).collect()
    }
}

/// Keys are relative, slash-separated and never climb out of their root
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::Local => Arc::new(LocalObjectStore::new(config.local_dir.clone(), UPLOADS_ROUTE)),
        StorageBackend::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or(StorageError::NotConfigured("STORAGE_ENDPOINT is required for the http backend"))?;
            Arc::new(HttpObjectStore::new(
                endpoint,
                config.public_url.as_deref(),
                config.token.clone(),
            )?)
        }
    };
    tracing::info!(backend = store.name(), "Object store ready");
    Ok(store)
}
