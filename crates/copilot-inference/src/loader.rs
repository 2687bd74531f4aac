//! Model loading.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use copilot_core::{defaults, Error, Result, TextGenerationBackend, TiktokenTokenizer};

use crate::cache::LoadedModel;
use crate::model_config::ModelConfig;
use crate::tgi::{TgiBackend, TgiConfig};

/// Turns a model configuration into a ready-to-use [`LoadedModel`].
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, config: &ModelConfig) -> Result<LoadedModel>;
}

/// Loads models served behind TGI-compatible endpoints at `{base_url}/{selector}`.
///
/// Prompts are counted by the endpoint's `/tokenize` route; cl100k is the
/// local fallback.
#[derive(Debug, Clone)]
pub struct HostedModelLoader {
    base_url: String,
    api_token: Option<String>,
}

impl HostedModelLoader {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token,
        }
    }

    /// Create from environment variables.
    ///
    /// - `INFERENCE_BASE_URL`: base URL for model endpoints
    /// - `INFERENCE_API_TOKEN`: optional bearer token
    pub fn from_env() -> Self {
        let base_url = std::env::var("INFERENCE_BASE_URL")
            .unwrap_or_else(|_| defaults::INFERENCE_URL.to_string());
        let api_token = std::env::var("INFERENCE_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        Self::new(base_url, api_token)
    }

    /// Endpoint root serving `config`.
    pub fn endpoint_for(&self, config: &ModelConfig) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), config.selector)
    }
}

#[async_trait]
impl ModelLoader for HostedModelLoader {
    #[instrument(skip(self, config), fields(subsystem = "inference", component = "loader", op = "load", model = %config.model_id))]
    async fn load(&self, config: &ModelConfig) -> Result<LoadedModel> {
        let endpoint = self.endpoint_for(config);

        let backend = TgiBackend::new(TgiConfig {
            endpoint: endpoint.clone(),
            api_token: self.api_token.clone(),
            model_id: config.model_id.clone(),
            ..TgiConfig::default()
        })?;

        if !backend.health_check().await? {
            return Err(Error::Inference(format!(
                "Model endpoint unavailable: {} ({})",
                config.model_id, endpoint
            )));
        }

        // Only consulted when the endpoint cannot tokenize
        let tokenizer = TiktokenTokenizer::cl100k()?;

        info!(
            endpoint = %endpoint,
            compute_tier = %config.compute_tier,
            "Model loaded"
        );

        Ok(LoadedModel {
            config: config.clone(),
            tokenizer: Arc::new(tokenizer),
            backend: Arc::new(backend),
        })
    }
}
