use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{header, StatusCode};
use std::time::Duration;
use url::Url;

use super::{validate_key, ObjectStore, StorageError};

/// S3-style bucket reachable over plain HTTP: objects are `PUT` and `DELETE`d
/// under `endpoint`, authorised with an optional bearer token.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: Url,
    public_base: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, public_url: Option<&str>, token: Option<String>) -> Result<Self, StorageError> {
        let mut endpoint =
            Url::parse(endpoint).map_err(|_| StorageError::NotConfigured("STORAGE_ENDPOINT is not a valid URL"))?;
        // Url::join drops the last path segment unless it ends with a slash
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let public_base = public_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| endpoint.as_str().trim_end_matches('/').to_string());

        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            endpoint,
            public_base,
            token,
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, StorageError> {
        validate_key(key)?;
        self.endpoint
            .join(key)
            .map_err(|_| StorageError::InvalidKey(key.to_string()))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Result<&'a str, StorageError> {
        url.strip_prefix(self.public_base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidKey(url.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<String, StorageError> {
        let target = self.object_url(key)?;
        let size = bytes.len();

        let response = self
            .authorize(self.client.put(target))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected {
                status: response.status().as_u16(),
                key: key.to_string(),
            });
        }

        tracing::debug!(key, size, "Uploaded object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = self.key_from_url(url)?;
        let target = self.object_url(key)?;

        let response = self.authorize(self.client.delete(target)).send().await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(StorageError::Rejected {
                status: status.as_u16(),
                key: key.to_string(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
