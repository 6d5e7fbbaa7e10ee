use crate::error::StoreError;
use crate::store::{BlobStore, StoreResult};
use reqwest::blocking::Client;

/// Object storage client for one bucket (`{url}/storage/v1/object/{bucket}`).
pub struct StorageClient {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: String,
    access_token: String,
}

impl StorageClient {
    pub fn new(url: &str, api_key: &str, bucket: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/storage/v1", url.trim_end_matches('/')),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
            access_token: api_key.to_string(),
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = token.to_string();
        self
    }

    fn public_prefix(&self) -> String {
        format!("{}/object/public/{}/", self.base_url, self.bucket)
    }
}

impl BlobStore for StorageClient {
    fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        let url = format!("{}/object/{}/{}", self.base_url, self.bucket, path);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(StoreError::api(status, body));
        }

        Ok(())
    }

    fn remove(&self, paths: &[String]) -> StoreResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = format!("{}/object/{}", self.base_url, self.bucket);
        log::debug!("DELETE {} {:?}", url, paths);

        let response = self
            .client
            .delete(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(StoreError::api(status, body));
        }

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.public_prefix(), path)
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        let marker = format!("/{}/", self.bucket);
        url.split_once(&marker)
            .map(|(_, path)| path.to_string())
            .filter(|p| !p.is_empty())
    }
}
