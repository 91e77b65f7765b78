//! REST implementation of the favorites store.
//!
//! This module provides a reqwest-based implementation of the
//! [`FavoritesStore`](crate::FavoritesStore) trait against a PostgREST-style
//! endpoint: upserts merge on the `(user_id, place_id)` unique pair, deletes
//! and listings filter with `eq.` query operators.

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::{FavoriteRecord, FavoritesStore, RemoteError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Client for the remote favorites table using reqwest.
#[derive(Debug)]
pub struct RestFavoritesStore {
    base_url: String,
    table: String,
    api_key: SecretString,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl RestFavoritesStore {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the REST service (e.g., "https://xyz.example.co")
    /// * `table` - The favorites table name
    /// * `api_key` - The service API key
    pub fn new(base_url: &str, table: impl Into<String>, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.into(),
            api_key,
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(&config.base_url, config.table, config.api_key)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Attach the key headers every request needs.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.get(url))
    }

    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.post(url))
    }

    fn delete_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.delete(url))
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Execute a request with no expected response body.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), RemoteError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(())
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> RemoteError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => RemoteError::NotFound(body_snippet),
            401 | 403 => RemoteError::Auth(body_snippet),
            409 | 422 => RemoteError::InvalidInput(body_snippet),
            _ => RemoteError::from_status(status, body_snippet),
        }
    }
}

#[async_trait]
impl FavoritesStore for RestFavoritesStore {
    async fn upsert(&self, record: &FavoriteRecord) -> Result<(), RemoteError> {
        let request = self
            .post_request(&self.table_url())
            .query(&[("on_conflict", "user_id,place_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(record);
        let result = self.execute_empty(request).await;
        if let Err(err) = &result {
            metrics::counter!("nutrilog_remote_write_failures_total").increment(1);
            tracing::debug!(place_id = %record.place_id, error = %err, "favorite upsert failed");
        }
        result
    }

    async fn delete(&self, user_id: &str, place_id: &str) -> Result<(), RemoteError> {
        let request = self.delete_request(&self.table_url()).query(&[
            ("user_id", format!("eq.{user_id}")),
            ("place_id", format!("eq.{place_id}")),
        ]);
        let result = self.execute_empty(request).await;
        if let Err(err) = &result {
            metrics::counter!("nutrilog_remote_write_failures_total").increment(1);
            tracing::debug!(%place_id, error = %err, "favorite delete failed");
        }
        result
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, RemoteError> {
        // Listing is idempotent, so transient failures get retried.
        self.retry
            .retry_async(
                || {
                    let request = self.get_request(&self.table_url()).query(&[
                        ("select", "*".to_string()),
                        ("user_id", format!("eq.{user_id}")),
                        ("order", "created_at.desc".to_string()),
                    ]);
                    self.execute_json::<Vec<FavoriteRecord>>(request)
                },
                RemoteError::is_retryable,
            )
            .await
    }
}
