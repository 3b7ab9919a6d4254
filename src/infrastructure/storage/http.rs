//! Object storage over HTTP (Azure Blob style REST API)

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, StatusCode};

use crate::domain::storage::BlobStore;
use crate::domain::PersistenceError;

const STORAGE_API_VERSION: &str = "2023-11-03";

/// Blob store addressing blobs as `{endpoint}/{container}/{path}`
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    container: String,
    access_token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(
        endpoint: impl Into<String>,
        container: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PersistenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PersistenceError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            container: container.into(),
            access_token: None,
        })
    }

    /// Attach a bearer token obtained elsewhere
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn blob_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.container.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.blob_url(path))
            .header("x-ms-version", STORAGE_API_VERSION);

        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, PersistenceError> {
        request
            .send()
            .await
            .map_err(|e| PersistenceError::transport(format!("Request failed: {}", e)))
    }
}

async fn unexpected_status(response: reqwest::Response, action: &str, path: &str) -> PersistenceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    PersistenceError::transport(format!("HTTP {} {} '{}': {}", status, action, path, body))
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn exists(&self, path: &str) -> Result<bool, PersistenceError> {
        let response = self.send(self.request(Method::HEAD, path)).await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected_status(response, "checking", path).await),
        }
    }

    async fn download(&self, path: &str) -> Result<Bytes, PersistenceError> {
        let response = self.send(self.request(Method::GET, path)).await?;

        match response.status() {
            status if status.is_success() => response
                .bytes()
                .await
                .map_err(|e| PersistenceError::transport(format!("Failed to read blob body: {}", e))),
            StatusCode::NOT_FOUND => Err(PersistenceError::not_found(path)),
            _ => Err(unexpected_status(response, "downloading", path).await),
        }
    }

    async fn upload(&self, path: &str, data: Bytes, overwrite: bool) -> Result<(), PersistenceError> {
        let mut request = self
            .request(Method::PUT, path)
            .header("x-ms-blob-type", "BlockBlob")
            .header("content-type", "application/json")
            .body(data);

        if !overwrite {
            request = request.header("if-none-match", "*");
        }

        let response = self.send(request).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Err(PersistenceError::conflict(path))
            }
            _ => Err(unexpected_status(response, "uploading", path).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpBlobStore {
        HttpBlobStore::new(server.uri(), "prompt-container", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_blob_url_normalizes_slashes() {
        let store = HttpBlobStore::new(
            "https://account.blob.core.windows.net/",
            "/prompt-container/",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            store.blob_url("/prompts.json"),
            "https://account.blob.core.windows.net/prompt-container/prompts.json"
        );
    }

    #[tokio::test]
    async fn test_exists() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/prompt-container/prompts.json"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.exists("prompts.json").await.unwrap());
        assert!(!store.exists("missing.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = store(&server).exists("prompts.json").await;
        assert!(matches!(result, Err(PersistenceError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prompt-container/prompts.json"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"[]".to_vec()))
            .mount(&server)
            .await;

        let store = store(&server).with_access_token("token-1");
        let data = store.download("prompts.json").await.unwrap();
        assert_eq!(data, Bytes::from_static(b"[]"));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let server = MockServer::start().await;

        let result = store(&server).download("prompts.json").await;
        assert!(matches!(result, Err(PersistenceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_upload_overwrite() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/prompt-container/prompts.json"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(body_bytes(b"[]".to_vec()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .upload("prompts.json", Bytes::from_static(b"[]"), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_without_overwrite_conflicts() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(header_exists("if-none-match"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let result = store(&server)
            .upload("prompts.json", Bytes::from_static(b"[]"), false)
            .await;
        assert!(matches!(result, Err(PersistenceError::Conflict { .. })));
    }
}
