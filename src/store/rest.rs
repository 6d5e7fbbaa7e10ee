use crate::error::StoreError;
use crate::store::{Query, RecordStore, StoreResult};
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;

/// PostgREST client for the hosted record store (`{url}/rest/v1/{table}`).
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: String,
}

impl RestClient {
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            access_token: api_key.to_string(),
        }
    }

    /// Use a signed-in user's token instead of the anonymous key for row-level access.
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = token.to_string();
        self
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        log::debug!("{} {}", method, url);

        self.client
            .request(method, &url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.access_token))
    }

    fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(StoreError::api(status, body))
    }

    fn rows(response: Response) -> StoreResult<Vec<Value>> {
        let text = Self::check(response)?.text()?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(&text)?;
        match value {
            Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }
}

impl RecordStore for RestClient {
    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let response = self
            .request(Method::GET, table)
            .query(&query.to_params())
            .send()?;

        Self::rows(response)
    }

    fn insert(&self, table: &str, row: &Value) -> StoreResult<Value> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row)
            .send()?;

        Self::rows(response)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Api {
                status: 200,
                message: format!("insert into {} returned no row", table),
            })
    }

    fn update(&self, table: &str, id: &str, patch: &Value) -> StoreResult<Value> {
        let response = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()?;

        Self::rows(response)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })
    }

    fn upsert(&self, table: &str, row: &Value, on_conflict: &[&str]) -> StoreResult<Value> {
        let response = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()?;

        Self::rows(response)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Api {
                status: 200,
                message: format!("upsert into {} returned no row", table),
            })
    }

    fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        let response = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{}", id))])
            .send()?;

        Self::check(response)?;
        Ok(())
    }
}
