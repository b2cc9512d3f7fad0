//! REST client for an Upstash-compatible key-value store.
//!
//! Every command is one HTTP round trip with bearer authorization:
//!
//! | Command | Request                                      |
//! |---------|----------------------------------------------|
//! | SET     | `POST /set/{key}` with `{"value": "..."}`    |
//! | GET     | `GET /get/{key}`                             |
//! | INCR    | `POST /incr/{key}` with `{"increment": n}`   |
//! | KEYS    | `GET /keys/{pattern}`                        |
//! | PING    | `GET /ping`                                  |
//!
//! Responses are `{"result": ...}` envelopes; a `null` result is a miss.

use async_trait::async_trait;
use fleet_core::{Error, Result};
use observability::metrics;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::StoreConfig;
use crate::kv::KeyValueStore;

/// Longest slice of an error body carried into error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct StoreEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the remote store.
#[derive(Clone)]
pub struct RestStore {
    base_url: Url,
    token: String,
    http_client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.settings.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(url = %config.url, "Created REST store client");

        Ok(Self {
            base_url: config.url.clone(),
            token: config.token.clone(),
            http_client,
        })
    }

    /// `{base}/{command}[/{arg}]`, with `arg` encoded as a single path segment.
    fn command_url(&self, command: &str, arg: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::configuration("Store URL cannot be a base URL"))?;
            segments.pop_if_empty().push(command);
            if let Some(arg) = arg {
                segments.push(arg);
            }
        }
        Ok(url)
    }

    /// Sends a command, recording latency and failures.
    async fn call<T: DeserializeOwned>(
        &self,
        command: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let start = Instant::now();
        metrics().store_requests.inc();

        let outcome = self.send(command, request).await;

        metrics()
            .store_latency_ms
            .observe(start.elapsed().as_millis() as u64);
        if outcome.is_err() {
            metrics().store_errors.inc();
        }
        outcome
    }

    async fn send<T: DeserializeOwned>(
        &self,
        command: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                warn!(command, error = %e, "Store request failed");
                Error::transport(format!("{command} request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(command, error = %e, "Failed to read store response");
            Error::transport(format!("{command} response unreadable: {e}"))
        })?;

        if !status.is_success() {
            warn!(command, status = %status, "Store returned error status");
            return Err(Error::transport_status(
                status.as_u16(),
                format!("{command} failed with {status}: {}", excerpt(&body)),
            ));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: StoreEnvelope = serde_json::from_str(&body).map_err(|e| {
            warn!(command, error = %e, "Undecodable store response");
            Error::transport(format!("{command} returned undecodable body: {e}"))
        })?;

        if let Some(err) = envelope.error {
            warn!(command, error = %err, "Store rejected command");
            return Err(Error::transport_status(
                status.as_u16(),
                format!("{command} rejected: {err}"),
            ));
        }

        match envelope.result {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                Error::parse(format!("{command} result has unexpected shape: {e}"))
            }),
        }
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl KeyValueStore for RestStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let url = self.command_url("set", Some(key))?;
        debug!(key, "SET");
        let request = self
            .http_client
            .post(url)
            .json(&json!({ "value": value }));
        self.call::<Value>("SET", request).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = self.command_url("get", Some(key))?;
        debug!(key, "GET");
        self.call("GET", self.http_client.get(url)).await
    }

    async fn incr(&self, key: &str, amount: i64) -> Result<i64> {
        let url = self.command_url("incr", Some(key))?;
        debug!(key, amount, "INCR");
        let request = self
            .http_client
            .post(url)
            .json(&json!({ "increment": amount }));
        self.call("INCR", request)
            .await?
            .ok_or_else(|| Error::parse("INCR returned no result"))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let url = self.command_url("keys", Some(pattern))?;
        debug!(pattern, "KEYS");
        Ok(self
            .call::<Vec<String>>("KEYS", self.http_client.get(url))
            .await?
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        let url = self.command_url("ping", None)?;
        self.call::<Value>("PING", self.http_client.get(url)).await?;
        Ok(())
    }
}
