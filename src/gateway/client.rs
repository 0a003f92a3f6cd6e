//! HTTP client for the tenant-local model server (SPEC §4.1).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};

use super::circuit_breaker::CircuitBreaker;
use super::types::{EmbedReply, EmbedRequest, GenerateOptions, HealthStatus, ModelReply};

/// Generation and embedding against the local model server, with a circuit
/// breaker protecting every call (SPEC §4.1).
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn generate(&self, options: GenerateOptions) -> Result<ModelReply>;
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>>;
    async fn health(&self) -> HealthStatus;
}

fn build_http_client(timeout_secs: u64) -> Client {
    let timeout = Duration::from_secs(timeout_secs);

    // Some sandboxed environments can panic during proxy auto-detection in
    // reqwest's default client builder. Fall back to no-proxy in that case.
    match catch_unwind(AssertUnwindSafe(|| Client::builder().timeout(timeout).build())) {
        Ok(Ok(client)) => client,
        Ok(Err(_)) | Err(_) => Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client"),
    }
}

/// [`ModelGateway`] backed by a local model server exposing `/generate`,
/// `/embed` and `/tags` (SPEC §4.1).
pub struct LocalModelGateway {
    base_url: String,
    http: Client,
    breaker: Arc<CircuitBreaker>,
    /// Max attempts for one `generate` call, including the initial try
    /// (SPEC §4.1). Only transient I/O and 5xx failures are retried.
    max_attempts: u32,
}

impl LocalModelGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        fail_threshold: u32,
        cooldown_seconds: u64,
        max_attempts: u32,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http: build_http_client(timeout_secs),
            breaker: Arc::new(CircuitBreaker::new(fail_threshold, cooldown_seconds)),
            max_attempts: max_attempts.max(1),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.base_url)
    }

    fn embed_url(&self) -> String {
        format!("{}/embed", self.base_url)
    }

    fn tags_url(&self) -> String {
        format!("{}/tags", self.base_url)
    }

    async fn try_generate_once(&self, options: &GenerateOptions) -> Result<ModelReply> {
        let result = self.http.post(self.generate_url()).json(options).send().await;

        match result {
            Ok(resp) if resp.status().is_success() => resp
                .json::<ModelReply>()
                .await
                .map_err(|e| Error::ModelTransient(format!("malformed reply: {e}"))),
            Ok(resp) if resp.status().is_server_error() => {
                Err(Error::ModelTransient(format!("model server status {}", resp.status())))
            }
            Ok(resp) => Err(Error::ModelOffline(format!("model server status {}", resp.status()))),
            Err(e) if e.is_timeout() => Err(Error::ModelTransient(format!("timeout: {e}"))),
            Err(e) => Err(Error::ModelOffline(format!("connection failed: {e}"))),
        }
    }
}

#[async_trait]
impl ModelGateway for LocalModelGateway {
    async fn generate(&self, options: GenerateOptions) -> Result<ModelReply> {
        if !self.breaker.allow() {
            return Err(Error::ModelOffline("circuit breaker open".to_string()));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_generate_once(&options).await {
                Ok(reply) => {
                    self.breaker.record_success();
                    return Ok(reply);
                }
                Err(Error::ModelTransient(reason)) if attempt < self.max_attempts => {
                    tokio::time::sleep(Duration::from_millis(100 * 2u64.pow(attempt - 1))).await;
                    tracing::warn!(attempt, reason, "retrying transient model gateway failure");
                    continue;
                }
                Err(e) => {
                    self.breaker.record_failure();
                    return Err(e);
                }
            }
        }
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        if !self.breaker.allow() {
            return Err(Error::ModelOffline("circuit breaker open".to_string()));
        }

        let body = EmbedRequest { model, input: text };
        let result = self.http.post(self.embed_url()).json(&body).send().await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.json::<EmbedReply>().await {
                Ok(reply) => {
                    self.breaker.record_success();
                    Ok(reply.embedding)
                }
                Err(e) => {
                    self.breaker.record_failure();
                    Err(Error::ModelTransient(format!("malformed embedding reply: {e}")))
                }
            },
            Ok(resp) => {
                self.breaker.record_failure();
                Err(Error::ModelOffline(format!("embed status {}", resp.status())))
            }
            Err(e) => {
                self.breaker.record_failure();
                Err(Error::ModelOffline(format!("connection failed: {e}")))
            }
        }
    }

    /// Queries the model server's tag listing without consuming a quota
    /// slot or going through the circuit breaker (SPEC §4.1).
    async fn health(&self) -> HealthStatus {
        match self.http.get(self.tags_url()).send().await {
            Ok(resp) if resp.status().is_success() => HealthStatus::Online,
            Ok(resp) if resp.status().is_server_error() => {
                HealthStatus::Degraded(format!("status {}", resp.status()))
            }
            Ok(resp) => HealthStatus::Offline(format!("status {}", resp.status())),
            Err(e) => HealthStatus::Offline(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_derived_from_base_url() {
        let gw = LocalModelGateway::new("http://127.0.0.1:11434", 30, 3, 60, 2);
        assert_eq!(gw.generate_url(), "http://127.0.0.1:11434/generate");
        assert_eq!(gw.embed_url(), "http://127.0.0.1:11434/embed");
        assert_eq!(gw.tags_url(), "http://127.0.0.1:11434/tags");
    }
}
