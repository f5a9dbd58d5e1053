//! Single-call access to the local inference service (Ollama HTTP API).
//!
//! `InferenceBackend` is the seam the rest of the pipeline depends on; the
//! HTTP implementation is `InferenceClient`. One call is one request and one
//! response: no retries, no streaming.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InferenceError;

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Default model served by the endpoint.
pub const DEFAULT_MODEL: &str = "llama2";
/// Timeout for the health/listing probe.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Decoding options and deadline for one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    /// Nucleus sampling cutoff; omitted from the request when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Deadline for the whole request/response exchange.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl GenerateOptions {
    pub fn new(temperature: f64, timeout: Duration) -> Self {
        Self {
            temperature,
            top_p: None,
            timeout,
        }
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Capability the judging pipeline delegates all topical judgment to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// True iff the service answers the listing probe with a success status.
    async fn health_check(&self) -> bool;

    /// Submit one prompt and return the completion text.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, InferenceError>;
}

/// Connection settings for `InferenceClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
    #[serde(with = "duration_secs")]
    pub health_timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// HTTP client for an Ollama-compatible endpoint.
pub struct InferenceClient {
    config: EndpointConfig,
    http: reqwest::Client,
}

impl InferenceClient {
    pub fn new(config: EndpointConfig) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.health_timeout)
            .build()
            .map_err(|e| InferenceError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn with_defaults() -> Result<Self, InferenceError> {
        Self::new(EndpointConfig::default())
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Names of the models the service currently offers.
    pub async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .http
            .get(self.url("/api/tags"))
            .timeout(self.config.health_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InferenceError::Protocol(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl InferenceBackend for InferenceClient {
    async fn health_check(&self) -> bool {
        match self
            .http
            .get(self.url("/api/tags"))
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(url = %self.config.base_url, error = %e, "health probe failed");
                false
            }
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, InferenceError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: SamplingOptions {
                temperature: options.temperature,
                top_p: options.top_p,
            },
        };

        let response = self
            .http
            .post(self.url("/api/generate"))
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InferenceError::Protocol(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        body.response
            .map(|text| text.trim().to_string())
            .ok_or_else(|| InferenceError::Protocol("response field missing".to_string()))
    }
}

/// Serialize `Duration` as fractional seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
