//! Upstash-compatible Redis REST backend.
//!
//! Speaks the Redis-over-REST protocol: one command per request, the
//! command and its arguments URL-encoded into the path, responses
//! wrapped in a `{"result": ...}` envelope. Values are sent as the
//! request body on SET so arbitrarily large JSON records round-trip
//! without path-length limits.

use crate::error::{StoreError, StoreResult};
use crate::KeyValueStore;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Configuration for the Redis REST backend.
#[derive(Debug, Clone)]
pub struct RedisRestConfig {
    /// Base URL of the REST endpoint (e.g. `https://usw1-example.upstash.io`).
    pub url: String,
    /// Bearer token for the REST endpoint.
    pub token: String,
}

/// Redis REST client.
pub struct RedisRestStore {
    config: RedisRestConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RestEnvelope {
    result: Option<Value>,
    error: Option<String>,
}

impl RedisRestStore {
    /// Creates a new client. Validates that the configuration is
    /// non-empty; the first request surfaces connectivity problems.
    pub fn new(config: RedisRestConfig) -> StoreResult<Self> {
        if config.url.is_empty() || config.token.is_empty() {
            return Err(StoreError::Config(
                "redis REST url and token must be set".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { config, client })
    }

    async fn command(&self, path: &str, body: Option<String>) -> StoreResult<Value> {
        let url = format!("{}/{}", self.config.url.trim_end_matches('/'), path);
        let request = match body {
            Some(body) => self.client.post(&url).body(body),
            None => self.client.get(&url),
        };
        let response = request
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = response.status();
        let envelope: RestEnvelope = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(StoreError::Backend(error));
        }
        if !status.is_success() {
            return Err(StoreError::Backend(format!(
                "redis REST returned status {status}"
            )));
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl KeyValueStore for RedisRestStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = format!("get/{}", urlencoding::encode(key));
        let result = self.command(&path, None).await?;
        match result {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            // Some deployments return already-decoded JSON for values
            // that were written as JSON; hand the raw text back and let
            // the caller's decoder normalize it.
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()> {
        let mut path = format!("set/{}", urlencoding::encode(key));
        if let Some(secs) = ttl_seconds {
            path.push_str(&format!("?EX={secs}"));
        }
        debug!(key, ttl = ?ttl_seconds, "redis SET");
        self.command(&path, Some(value.to_string())).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = format!("del/{}", urlencoding::encode(key));
        self.command(&path, None).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let path = format!("keys/{}", urlencoding::encode(pattern));
        let result = self.command(&path, None).await?;
        match result {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(StoreError::Backend(format!(
                "unexpected KEYS result: {other}"
            ))),
        }
    }
}
