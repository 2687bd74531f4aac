//! Text-Generation-Inference compatible backend.
//!
//! Talks to one hosted model endpoint:
//! - `POST {endpoint}/generate` with `{"inputs", "parameters"}`
//! - `POST {endpoint}/tokenize` with `{"inputs"}`, one entry per token
//! - `GET {endpoint}/health`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use copilot_core::{defaults, Error, GenerationParams, Result, TextGenerationBackend};

/// Configuration for one hosted model endpoint.
#[derive(Debug, Clone)]
pub struct TgiConfig {
    /// Endpoint root; `/generate` and `/health` are appended.
    pub endpoint: String,
    /// Bearer token, if the endpoint requires one.
    pub api_token: Option<String>,
    /// Model identifier served at the endpoint.
    pub model_id: String,
    /// Transport-level request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for TgiConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::INFERENCE_URL.to_string(),
            api_token: None,
            model_id: String::new(),
            timeout_seconds: defaults::WORKFLOW_GEN_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Servers answer with either a single object or a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Single(GeneratedText),
    Batch(Vec<GeneratedText>),
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerateResponse::Single(g) => Some(g.generated_text),
            GenerateResponse::Batch(batch) => batch.into_iter().next().map(|g| g.generated_text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP backend for a TGI-style endpoint.
pub struct TgiBackend {
    client: Client,
    config: TgiConfig,
}

impl TgiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: TgiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing TGI backend: endpoint={}, model={}",
            config.endpoint, config.model_id
        );

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_token {
            Some(ref token) => req.header("Authorization", format!("Bearer {}", token)),
            None => req,
        }
    }
}

#[async_trait]
impl TextGenerationBackend for TgiBackend {
    async fn generate_text(&self, inputs: &str, params: &GenerationParams) -> Result<String> {
        debug!(
            "Generating with model {}, prompt length: {}, max_new_tokens: {}",
            self.config.model_id,
            inputs.len(),
            params.max_new_tokens
        );

        let request = GenerateRequest {
            inputs,
            parameters: params,
        };

        let response = self
            .authorize(self.client.post(self.url("/generate")))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Error::Inference(format!(
                "Model endpoint returned {}: {}",
                status, message
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let text = result
            .into_text()
            .ok_or_else(|| Error::Inference("Model endpoint returned no generations".into()))?;

        debug!("Generation complete, response length: {}", text.len());
        Ok(text)
    }

    async fn count_tokens(&self, inputs: &str) -> Result<Option<usize>> {
        let response = self
            .authorize(self.client.post(self.url("/tokenize")))
            .timeout(Duration::from_secs(defaults::TOKENIZE_TIMEOUT_SECS))
            .json(&TokenizeRequest { inputs })
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Tokenize request failed: {}", e)))?;

        // Servers without a tokenizer route
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
        ) {
            debug!("Model endpoint has no tokenize route: {}", self.config.model_id);
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Model endpoint returned {}: {}",
                status, body
            )));
        }

        let tokens: Vec<serde::de::IgnoredAny> = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse tokenize response: {}", e)))?;

        Ok(Some(tokens.len()))
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .authorize(self.client.get(self.url("/health")))
            .timeout(Duration::from_secs(defaults::HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Model endpoint health check passed: {}", self.config.model_id);
                Ok(true)
            }
            Ok(resp) => {
                warn!("Model endpoint health check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Model endpoint health check error: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model_id
    }
}
